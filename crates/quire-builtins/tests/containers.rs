use quire_builtins::{Dtype, Matrix, Rational, Shape, Table, Value, ValueMap};

fn num(n: i64) -> Value {
    Value::Num(Rational::from_i64(n))
}

#[test]
fn vector_shapes_come_from_dimensions() {
    let row = Matrix::row_vector(vec![num(1), num(2), num(3)]);
    assert_eq!(Value::Matrix(row).shape(), Shape::RowVector);
    let col = Matrix::column_vector(vec![num(1), num(2)]);
    assert_eq!(Value::Matrix(col).shape(), Shape::ColumnVector);
    let full = Matrix::new(vec![num(1), num(2), num(3), num(4)], 2, 2).unwrap();
    assert_eq!(Value::Matrix(full).shape(), Shape::Matrix);
}

#[test]
fn transpose_swaps_dimensions() {
    let m = Matrix::new(vec![num(1), num(2), num(3), num(4), num(5), num(6)], 2, 3).unwrap();
    let t = m.transpose();
    assert_eq!((t.rows, t.cols), (3, 2));
    assert_eq!(t.get(0, 1).unwrap(), &num(4));
    assert_eq!(t.get(2, 0).unwrap(), &num(3));
}

#[test]
fn matrix_element_count_must_match() {
    assert!(Matrix::new(vec![num(1), num(2), num(3)], 2, 2).is_err());
}

#[test]
fn map_values_share_one_dtype() {
    let ok = ValueMap::new(vec![
        ("a".to_string(), num(1)),
        ("b".to_string(), num(2)),
    ])
    .unwrap();
    assert_eq!(ok.value_dtype(), Some(Dtype::Rational));
    assert_eq!(ok.get("b"), Some(&num(2)));

    let mixed = ValueMap::new(vec![
        ("a".to_string(), num(1)),
        ("b".to_string(), Value::Bool(true)),
    ]);
    assert!(mixed.is_err());
}

#[test]
fn map_of_vectors_is_its_own_shape() {
    let map = ValueMap::new(vec![
        (
            "xs".to_string(),
            Value::Matrix(Matrix::row_vector(vec![num(1), num(2)])),
        ),
        (
            "ys".to_string(),
            Value::Matrix(Matrix::row_vector(vec![num(3), num(4)])),
        ),
    ])
    .unwrap();
    assert_eq!(Value::Map(map).shape(), Shape::MapOfVectors);
}

const CSV: &str = "name, width, height\n, m, m\nbeam, 0.2, 0.4\nslab, 6, 0.25";

#[test]
fn table_from_text_reads_headings_units_and_row_names() {
    let table = Table::from_text(CSV).unwrap();
    assert_eq!(table.num_cols(), 3);
    assert_eq!(table.num_rows(), 2);
    assert_eq!(table.storage().units[1], "m");
    assert_eq!(table.row_index("slab"), Some(1));
    let (values, unit) = table.column_values(1).unwrap();
    assert_eq!(unit, "m");
    assert_eq!(values[1], Value::Num(Rational::from_i64(6)));
}

#[test]
fn table_append_is_copy_on_write() {
    let table = Table::from_text(CSV).unwrap();
    let alias = table.clone();
    assert!(table.shares_storage(&alias));

    let widened = table
        .with_column(
            "area".to_string(),
            vec!["0.08".to_string(), "1.5".to_string()],
            Dtype::Rational,
            "m^2".to_string(),
        )
        .unwrap();
    // The original operand still sees the data it captured.
    assert!(!widened.shares_storage(&table));
    assert_eq!(table.num_cols(), 3);
    assert_eq!(alias.num_cols(), 3);
    assert_eq!(widened.num_cols(), 4);
}
