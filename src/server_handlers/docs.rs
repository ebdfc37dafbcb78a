use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::models::{DiaSemana, HorarioInput};

pub async fn help_handler() -> impl Responder {
    let horarios = vec![
        HorarioInput::new(DiaSemana::Lunes, "09:00", "10:00"),
        HorarioInput::new(DiaSemana::Lunes, "09:30", "10:30"),
    ];

    let help = json!({
        "description": "API de cuotas y horarios SIGESDA. Los montos viajan como decimales en texto; las horas en formato HH:MM.",
        "endpoints": {
            "GET /catalogo/tipos-item": "catálogo de tipos de ítem vigente",
            "PUT /catalogo/tipos-item": "reemplaza el catálogo (lista de {codigo, nombre, categoriaItem})",
            "POST /cuotas": "registra o reemplaza una cuota (409 mientras se recalcula)",
            "GET /cuotas/{id}": "cuota con sus ítems",
            "GET /cuotas/{id}/desglose": "desglose por categoría, bloques y columnas DEBE/HABER",
            "POST /cuotas/desglose": "desglose de una lista de ítems arbitraria",
            "POST /cuotas/{id}/items": "agrega un ítem manual",
            "POST /cuotas/{id}/recalcular": "recalcula la cuota (409 si ya hay un recálculo en curso)",
            "POST /cuotas/generacion/plan": "personas a las que corresponde generar cuota en un período",
            "POST /ajustes/activos": "ajustes vigentes en una fecha, en orden de aplicación",
            "POST /exenciones/activa": "exención vigente en una fecha",
            "POST /exenciones/transicion": "siguiente estado de una exención",
            "POST /secciones/horarios/validar": "solapamientos entre los horarios de una sección",
            "POST /secciones/conflictos": "conflictos de docentes/aulas para una asignación en lote",
            "POST /secciones/conflictos/recurso": "conflictos de un único candidato",
            "GET /secciones/ocupacion": "porcentaje y estado de ocupación",
            "POST /secciones/inscripcion/verificar": "verifica si una persona puede inscribirse"
        },
        "validar_example": {"horarios": horarios},
        "ocupacion_example_query": "/secciones/ocupacion?participantes=40&capacidad=50",
        "errores": "400 datos inválidos, 404 cuota inexistente, 409 recálculo en curso, 422 política, 502 falla remota"
    });

    HttpResponse::Ok().json(help)
}
