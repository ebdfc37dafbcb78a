use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sigesda::config::LedgerConfig;
use sigesda::cuotas::items::CONCEPTO_MIN;
use sigesda::cuotas::{
    add_manual_item, agrupar_en_bloques, classify_sign, columnas_debe_haber, compute_category_subtotal, compute_grand_total,
    desglose, total_cuota, CatalogoItems, NuevoItemManual, Signo,
};
use sigesda::error::SigesdaError;
use sigesda::models::{Cuota, ItemCuota};
use sigesda::store::MemoriaCuotas;
use std::collections::BTreeMap;

fn item(id: i64, categoria: &str, monto: Decimal, cantidad: u32) -> ItemCuota {
    ItemCuota {
        id,
        cuota_id: 1,
        tipo_item_codigo: categoria.to_string(),
        categoria_codigo: categoria.to_string(),
        concepto: format!("Ítem {}", id),
        monto,
        cantidad,
        porcentaje: None,
        es_automatico: false,
        es_editable: true,
        observaciones: None,
        metadata: None,
    }
}

fn escenario_a() -> Vec<ItemCuota> {
    vec![
        item(1, "BASE", dec!(5000), 1),
        item(2, "ACTIVIDAD", dec!(1200), 2),
        item(3, "DESCUENTO", dec!(-750), 1),
    ]
}

fn cuota_con(items: Vec<ItemCuota>) -> Cuota {
    Cuota {
        id: 1,
        recibo_id: 10,
        persona_id: 100,
        mes: 3,
        anio: 2025,
        categoria_id: 1,
        items,
        monto_total: Decimal::ZERO,
        monto_base: None,
        monto_actividades: None,
    }
}

#[test]
fn test_escenario_a_total() {
    // 5000 + 2400 - 750
    assert_eq!(compute_grand_total(&escenario_a()), dec!(6650));
}

#[test]
fn test_total_igual_suma_de_subtotales() {
    let mut items = escenario_a();
    items.push(item(4, "RECARGO", dec!(300), 1));
    items.push(item(5, "OTRO", dec!(-100), 3));
    items.push(item(6, "ACTIVIDAD", dec!(850.50), 1));

    let mut grupos: BTreeMap<String, Vec<ItemCuota>> = BTreeMap::new();
    for it in &items {
        grupos.entry(it.categoria_codigo.clone()).or_default().push(it.clone());
    }
    let suma: Decimal = grupos.values().map(|g| compute_category_subtotal(g)).sum();
    assert_eq!(compute_grand_total(&items), suma);
}

#[test]
fn test_classify_sign() {
    assert_eq!(classify_sign("BASE"), Signo::Positivo);
    assert_eq!(classify_sign("ACTIVIDAD"), Signo::Positivo);
    assert_eq!(classify_sign("RECARGO"), Signo::Positivo);
    assert_eq!(classify_sign("ADICIONAL"), Signo::Positivo);
    assert_eq!(classify_sign("DESCUENTO"), Signo::Negativo);
    assert_eq!(classify_sign("UNKNOWN_FUTURE_CODE"), Signo::Negativo);
    assert_eq!(classify_sign(" base "), Signo::Positivo);
}

#[test]
fn test_columnas_debe_haber() {
    let items = escenario_a();
    assert_eq!(columnas_debe_haber(&items[1]), (dec!(2400), Decimal::ZERO));
    assert_eq!(columnas_debe_haber(&items[2]), (Decimal::ZERO, dec!(750)));
}

#[test]
fn test_desglose_totales() {
    let mut items = escenario_a();
    items.push(item(4, "RECARGO", dec!(300), 1));
    let d = desglose(&items);
    assert_eq!(d.totales.base, dec!(5000));
    assert_eq!(d.totales.actividades, dec!(2400));
    assert_eq!(d.totales.descuentos, dec!(-750));
    assert_eq!(d.totales.recargos, dec!(300));
    assert_eq!(d.totales.total, dec!(6950));
    assert_eq!(d.desglose["ACTIVIDAD"].items.len(), 1);
}

#[test]
fn test_bloques_ajustes_juntos() {
    let mut items = escenario_a();
    items.push(item(4, "RECARGO", dec!(300), 1));
    items.push(item(5, "ADICIONAL", dec!(50), 1));
    let claves: Vec<String> = agrupar_en_bloques(&items).into_iter().map(|b| b.clave).collect();
    assert_eq!(claves, vec!["BASE", "ACTIVIDAD", "AJUSTES", "ADICIONAL"]);
}

#[test]
fn test_total_cuota_modo_legacy() {
    let mut cuota = cuota_con(escenario_a());
    cuota.monto_base = Some(dec!(5000));
    cuota.monto_actividades = Some(dec!(1000));
    let legacy = LedgerConfig { sistema_items: false, ..LedgerConfig::default() };
    assert_eq!(total_cuota(&cuota, &legacy), dec!(6000));
    assert_eq!(total_cuota(&cuota, &LedgerConfig::default()), dec!(6650));
}

#[test]
fn test_escenario_b_concepto_corto() {
    let mut store = MemoriaCuotas::new();
    store.reemplazar(cuota_con(vec![]));
    let nuevo = NuevoItemManual {
        cuota_id: 1,
        tipo_item_codigo: "ADICIONAL".to_string(),
        concepto: "ab".to_string(),
        monto: dec!(100),
        cantidad: 1,
        observaciones: None,
    };
    assert!(nuevo.concepto.len() < CONCEPTO_MIN);
    let err = add_manual_item(&mut store, &CatalogoItems::predeterminado(), &nuevo).unwrap_err();
    match err {
        SigesdaError::Validacion(e) => assert!(e.contiene("concepto")),
        other => panic!("se esperaba error de validación, llegó {:?}", other),
    }
    assert!(store.obtener(1).unwrap().items.is_empty());
}

#[test]
fn test_item_manual_descuento_resta() {
    let mut store = MemoriaCuotas::new();
    store.reemplazar(cuota_con(escenario_a()));
    let nuevo = NuevoItemManual {
        cuota_id: 1,
        tipo_item_codigo: "DESCUENTO_MANUAL".to_string(),
        concepto: "Descuento por pronto pago".to_string(),
        monto: dec!(150),
        cantidad: 1,
        observaciones: None,
    };
    let guardado = add_manual_item(&mut store, &CatalogoItems::predeterminado(), &nuevo).unwrap();
    assert!(!guardado.es_automatico);
    assert_eq!(guardado.contribucion(), dec!(-150));
    assert_eq!(store.obtener(1).unwrap().monto_total, dec!(6500));
}

#[test]
fn test_tipo_desconocido_es_politica() {
    let mut store = MemoriaCuotas::new();
    store.reemplazar(cuota_con(vec![]));
    let nuevo = NuevoItemManual {
        cuota_id: 1,
        tipo_item_codigo: "NO_EXISTE".to_string(),
        concepto: "Cargo raro".to_string(),
        monto: dec!(100),
        cantidad: 1,
        observaciones: None,
    };
    let err = add_manual_item(&mut store, &CatalogoItems::predeterminado(), &nuevo).unwrap_err();
    assert!(matches!(err, SigesdaError::Politica(_)));
}
