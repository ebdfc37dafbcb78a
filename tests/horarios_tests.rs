use sigesda::error::SigesdaError;
use sigesda::horarios::{
    compute_occupancy, detect_resource_conflicts, detect_same_day_overlaps, detectar_conflictos_asignacion, is_valid_interval,
    overlaps, to_minutes, Asignacion, Candidato, EstadoOcupacion, Ocupacion, Recurso, SolicitudAsignacion,
};
use sigesda::models::{DiaSemana, HorarioInput};

fn asignacion_docente(docente: i64, dia: DiaSemana, inicio: &str, fin: &str, seccion_id: i64) -> Asignacion {
    Asignacion {
        recurso: Recurso::DocenteId(docente),
        dia_semana: dia,
        hora_inicio: inicio.to_string(),
        hora_fin: fin.to_string(),
        seccion_id,
        seccion_nombre: format!("Sección {}", seccion_id),
    }
}

fn candidato(docente: i64, dia: DiaSemana, inicio: &str, fin: &str) -> Candidato {
    Candidato {
        dia_semana: dia,
        hora_inicio: inicio.to_string(),
        hora_fin: fin.to_string(),
        recurso: Recurso::DocenteId(docente),
    }
}

#[test]
fn test_to_minutes() {
    assert_eq!(to_minutes("00:00"), Ok(0));
    assert_eq!(to_minutes("08:30"), Ok(510));
    assert_eq!(to_minutes("23:59"), Ok(1439));
    assert!(to_minutes("24:00").is_err());
    assert!(to_minutes("9:00").is_err());
    assert!(to_minutes("09:60").is_err());
    assert!(to_minutes("ab:cd").is_err());
}

#[test]
fn test_is_valid_interval() {
    assert!(is_valid_interval("09:00", "10:00"));
    assert!(!is_valid_interval("10:00", "09:00"));
    assert!(!is_valid_interval("09:00", "09:00"));
    assert!(!is_valid_interval("09:00", "25:00"));
}

#[test]
fn test_overlaps_limites() {
    // 09:00-10:00 y 10:00-11:00 son consecutivos
    assert!(!overlaps((540, 600), (600, 660)));
    // 09:00-10:30 y 10:00-11:00
    assert!(overlaps((540, 630), (600, 660)));
    assert!(overlaps((600, 660), (540, 630)));
}

#[test]
fn test_solapamientos_mismo_dia() {
    let horarios = vec![
        HorarioInput::new(DiaSemana::Lunes, "09:00", "10:00"),
        HorarioInput::new(DiaSemana::Lunes, "09:30", "10:30"),
        HorarioInput::new(DiaSemana::Lunes, "10:30", "11:30"),
        HorarioInput::new(DiaSemana::Martes, "09:00", "10:00"),
    ];
    let conflictos = detect_same_day_overlaps(&horarios).unwrap();
    assert_eq!(conflictos.len(), 1);
    assert_eq!((conflictos[0].indice_a, conflictos[0].indice_b), (0, 1));
    assert_eq!(conflictos[0].dia_semana, DiaSemana::Lunes);
}

#[test]
fn test_horarios_inactivos_no_cuentan() {
    let mut inactivo = HorarioInput::new(DiaSemana::Lunes, "09:30", "10:30");
    inactivo.activo = false;
    let horarios = vec![HorarioInput::new(DiaSemana::Lunes, "09:00", "10:00"), inactivo];
    assert!(detect_same_day_overlaps(&horarios).unwrap().is_empty());
}

#[test]
fn test_hora_mal_formada_indica_indice() {
    let horarios = vec![
        HorarioInput::new(DiaSemana::Lunes, "09:00", "10:00"),
        HorarioInput::new(DiaSemana::Lunes, "9:30", "10:30"),
    ];
    match detect_same_day_overlaps(&horarios) {
        Err(SigesdaError::Validacion(e)) => assert!(e.contiene("horarios[1].horaInicio")),
        other => panic!("se esperaba error de validación, llegó {:?}", other),
    }
}

#[test]
fn test_escenario_c_conflicto_de_docente() {
    let existentes = vec![asignacion_docente(4, DiaSemana::Lunes, "09:00", "10:00", 20)];

    let lunes = detect_resource_conflicts(&candidato(4, DiaSemana::Lunes, "09:30", "10:30"), &existentes).unwrap();
    assert_eq!(lunes.len(), 1);
    assert_eq!(lunes[0].seccion_id, 20);
    assert_eq!(lunes[0].detalle.seccion_nombre, "Sección 20");

    let martes = detect_resource_conflicts(&candidato(4, DiaSemana::Martes, "09:30", "10:30"), &existentes).unwrap();
    assert!(martes.is_empty());
}

#[test]
fn test_recursos_distintos_no_chocan() {
    let existentes = vec![asignacion_docente(4, DiaSemana::Lunes, "09:00", "10:00", 20)];
    let otro_docente = detect_resource_conflicts(&candidato(5, DiaSemana::Lunes, "09:00", "10:00"), &existentes).unwrap();
    assert!(otro_docente.is_empty());

    let mut aula = candidato(4, DiaSemana::Lunes, "09:00", "10:00");
    aula.recurso = Recurso::AulaId(4);
    assert!(detect_resource_conflicts(&aula, &existentes).unwrap().is_empty());
}

#[test]
fn test_lote_detecta_conflicto_interno() {
    // dos horarios superpuestos de la misma sección con el mismo docente
    let solicitud = SolicitudAsignacion {
        seccion_id: 30,
        seccion_nombre: "Coro".to_string(),
        docente_ids: vec![4],
        aula_ids: vec![],
        horarios: vec![
            HorarioInput::new(DiaSemana::Miercoles, "18:00", "19:00"),
            HorarioInput::new(DiaSemana::Miercoles, "18:30", "19:30"),
        ],
        existentes: vec![],
    };
    let conflictos = detectar_conflictos_asignacion(&solicitud).unwrap();
    assert_eq!(conflictos.len(), 1);
    assert_eq!(conflictos[0].recurso, Recurso::DocenteId(4));
}

#[test]
fn test_lote_ignora_asignaciones_propias() {
    let solicitud = SolicitudAsignacion {
        seccion_id: 30,
        seccion_nombre: "Coro".to_string(),
        docente_ids: vec![4, 5],
        aula_ids: vec![],
        horarios: vec![HorarioInput::new(DiaSemana::Jueves, "18:00", "19:00")],
        existentes: vec![
            asignacion_docente(4, DiaSemana::Jueves, "18:00", "19:00", 30),
            asignacion_docente(5, DiaSemana::Jueves, "18:30", "20:00", 31),
        ],
    };
    let conflictos = detectar_conflictos_asignacion(&solicitud).unwrap();
    assert_eq!(conflictos.len(), 1);
    assert_eq!(conflictos[0].recurso, Recurso::DocenteId(5));
    assert_eq!(conflictos[0].seccion_id, 31);
}

#[test]
fn test_ocupacion() {
    assert_eq!(compute_occupancy(40, Some(50)), Ocupacion { porcentaje: Some(80), estado: EstadoOcupacion::Parcial });
    assert_eq!(compute_occupancy(50, Some(50)), Ocupacion { porcentaje: Some(100), estado: EstadoOcupacion::Llena });
    assert_eq!(compute_occupancy(5, None), Ocupacion { porcentaje: None, estado: EstadoOcupacion::Disponible });
}

#[test]
fn test_recurso_wire() {
    let a: Asignacion = serde_json::from_str(
        r#"{"docenteId":4,"diaSemana":"LUNES","horaInicio":"09:00","horaFin":"10:00","seccionId":20,"seccionNombre":"Yoga"}"#,
    )
    .unwrap();
    assert_eq!(a.recurso, Recurso::DocenteId(4));
}
