//! Shared in-memory test tables.

use crate::config::{SourceSchema, VehicleCategory};
use crate::data::loader::DataLoader;
use crate::data::tables::{AccidentTables, IndicatorTable};
use polars::prelude::*;

pub const YEARS: [&str; 4] = ["2020", "2021", "2022", "2023"];

/// Subdivisions with their 2023 total events, in source row order.
/// Guanajuato and Sonora tie.
pub const STATES: [(&str, f64); 12] = [
    ("Jalisco", 50_000.0),
    ("Nuevo León", 45_000.0),
    ("Chihuahua", 40_000.0),
    ("Guanajuato", 30_000.0),
    ("Sonora", 30_000.0),
    ("Michoacán", 20_000.0),
    ("Baja California", 18_000.0),
    ("Coahuila", 15_000.0),
    ("Querétaro", 12_000.0),
    ("Yucatán", 10_000.0),
    ("Tabasco", 9_000.0),
    ("Tlaxcala", 1_000.0),
];

type Row<'a> = (&'a str, &'a str, [f64; 4]);

/// Build a raw frame with "Entidad" / "Variable" and one column per year.
pub fn indicator_frame(rows: &[Row<'_>], year_suffix: &str) -> DataFrame {
    let mut columns = vec![
        Column::new(
            "Entidad".into(),
            rows.iter().map(|r| r.0).collect::<Vec<&str>>(),
        ),
        Column::new(
            "Variable".into(),
            rows.iter().map(|r| r.1).collect::<Vec<&str>>(),
        ),
    ];
    for (idx, year) in YEARS.iter().enumerate() {
        columns.push(Column::new(
            format!("{}{}", year, year_suffix).into(),
            rows.iter().map(|r| r.2[idx]).collect::<Vec<f64>>(),
        ));
    }
    DataFrame::new(columns).unwrap()
}

pub fn indicator_table(name: &str, rows: &[Row<'_>]) -> IndicatorTable {
    DataLoader::indicator_table(name, indicator_frame(rows, ""), &SourceSchema::default())
        .unwrap()
}

fn state_rows(variable: &'static str) -> Vec<Row<'static>> {
    STATES
        .iter()
        .map(|(name, v)| (*name, variable, [v * 0.9, v * 0.95, v * 0.97, *v]))
        .collect()
}

/// Vehicle registrations. Tlaxcala only has automobiles; Atlantis has no accident row.
pub fn vehicle_frame() -> DataFrame {
    df!(
        "ENTIDAD FEDERATIVA" => ["Jalisco", "Atlantis", "Nuevo León", "Tlaxcala", "Chihuahua"],
        "AUTOMÓVILES SUMA" => [3_000_000.0, 10.0, 2_500_000.0, 5_000.0, 1_200_000.0],
        "CAMIONES PARA PASAJEROS SUMA" => [40_000.0, 0.0, 35_000.0, 0.0, 0.0],
        "CAMIONES Y CAMIONETAS PARA CARGA SUMA" => [900_000.0, 0.0, 850_000.0, 0.0, 600_000.0],
        "MOTOCICLETAS SUMA" => [400_000.0, 0.0, 150_000.0, 0.0, 90_000.0],
        "TOTAL" => [4_340_000.0, 10.0, 3_535_000.0, 5_000.0, 1_890_000.0]
    )
    .unwrap()
}

fn class_rows() -> Vec<Row<'static>> {
    vec![
        ("Nacional", "Fatal (Absoluto)", [2_800.0, 2_900.0, 2_950.0, 3_000.0]),
        ("Jalisco", "Total de eventos (Absoluto)", [45_000.0, 47_500.0, 48_500.0, 50_000.0]),
        ("Jalisco", "Fatal (Absoluto)", [400.0, 420.0, 430.0, 500.0]),
        ("Jalisco", "No fatal (Absoluto)", [9_000.0, 9_500.0, 9_700.0, 9_500.0]),
        ("Jalisco", "Solo daños (Absoluto)", [35_600.0, 37_580.0, 38_370.0, 40_000.0]),
    ]
}

/// The class table with one year column removed.
pub fn classes_without_year(year: &str) -> IndicatorTable {
    let df = indicator_frame(&class_rows(), "").drop(year).unwrap();
    DataLoader::indicator_table("classes", df, &SourceSchema::default()).unwrap()
}

/// Complete fixture: national 2023 total events = 350,000.
pub fn tables() -> AccidentTables {
    let schema = SourceSchema::default();

    let mut cause_rows: Vec<Row<'static>> = vec![
        (
            "Nacional",
            "Total de eventos (Absoluto)",
            [300_000.0, 320_000.0, 340_000.0, 350_000.0],
        ),
        (
            "Nacional",
            "Conductor (Absoluto)",
            [200_000.0, 210_000.0, 220_000.0, 230_000.0],
        ),
        (
            "Nacional",
            "Peatón o pasajero (Absoluto)",
            [40_000.0, 40_000.0, 42_000.0, 40_000.0],
        ),
        (
            "Nacional",
            "Falla del vehículo (Absoluto)",
            [0.0, 5_000.0, 6_000.0, 8_000.0],
        ),
        (
            "Nacional",
            "Mala condición del camino (Absoluto)",
            [60_000.0, 65_000.0, 72_000.0, 72_000.0],
        ),
    ];
    cause_rows.extend(state_rows("Total de eventos (Absoluto)"));

    let class_rows = class_rows();

    let type_rows: Vec<Row<'static>> = vec![
        ("Jalisco", "Total de eventos (Absoluto)", [45_000.0, 47_500.0, 48_500.0, 50_000.0]),
        ("Jalisco", "Colisión con vehículo automotor (Absoluto)", [30_000.0, 31_000.0, 32_000.0, 33_000.0]),
        ("Jalisco", "Colisión con peatón (Absoluto)", [5_000.0, 5_500.0, 5_600.0, 6_000.0]),
        ("Jalisco", "Volcadura (Absoluto)", [1_000.0, 1_100.0, 1_200.0, 1_000.0]),
    ];

    let victim_rows: Vec<Row<'static>> = vec![
        ("Nacional", "Total de víctimas muertas (Absoluto)", [4_200.0, 4_300.0, 4_400.0, 4_500.0]),
        ("Nacional", "Total de víctimas heridas (Absoluto)", [80_000.0, 82_000.0, 84_000.0, 85_000.0]),
    ];

    AccidentTables {
        // Cause headers carry the marker to exercise normalization
        causes: DataLoader::indicator_table(
            "causes",
            indicator_frame(&cause_rows, " (Absoluto)"),
            &schema,
        )
        .unwrap(),
        classes: indicator_table("classes", &class_rows),
        types: indicator_table("types", &type_rows),
        victims: indicator_table("victims", &victim_rows),
        vehicles: DataLoader::vehicle_table(vehicle_frame(), &schema, &VehicleCategory::defaults())
            .unwrap(),
    }
}
