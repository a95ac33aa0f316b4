//! Integration tests for loading, encoding and splitting the dataset.

use std::collections::HashSet;
use std::io::Write;

use sporeprint_classifiers::config::{ClassLabel, DataConfig};
use sporeprint_classifiers::data_handling::{load_dataset, train_test_split};
use sporeprint_classifiers::error::ClassifierError;
use sporeprint_classifiers::io::read_csv_table;

const MUSHROOMS: &str = "\
type,cap-shape,cap-color,odor,ring-type
p,x,n,p,p
e,x,y,a,p
e,b,w,l,p
p,x,w,p,p
e,x,g,n,e
e,x,y,a,p
e,b,w,a,p
e,b,w,l,p
p,x,w,p,p
e,b,y,a,p
e,x,y,l,p
e,x,y,a,p
e,b,y,a,p
p,x,w,p,p
e,x,n,n,e
e,k,g,n,e
e,s,g,n,e
e,f,w,n,e
p,x,n,p,p
p,x,y,p,p
";

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> DataConfig {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    DataConfig {
        path,
        ..DataConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Loading & encoding
// ---------------------------------------------------------------------------

#[test]
fn load_dataset_encodes_every_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "mushrooms.csv", MUSHROOMS);
    let table = load_dataset(&config).unwrap();

    assert_eq!(table.nrows(), 20);
    assert_eq!(table.ncols(), 5);
    assert_eq!(table.columns[0], "type");

    let raw = read_csv_table(&config.path).unwrap();
    for col in 0..table.ncols() {
        let distinct_raw: HashSet<&str> = raw.column(col).collect();
        let distinct_codes: HashSet<u32> = table.values.column(col).iter().copied().collect();
        assert_eq!(
            distinct_raw.len(),
            distinct_codes.len(),
            "column {}",
            table.columns[col]
        );
        // codes are dense: 0..k
        assert!(distinct_codes.iter().all(|&c| (c as usize) < distinct_codes.len()));
    }
}

#[test]
fn equal_strings_share_a_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "mushrooms.csv", MUSHROOMS);
    let table = load_dataset(&config).unwrap();
    let raw = read_csv_table(&config.path).unwrap();

    let odor = table.column_index("odor").unwrap();
    let encoder = table.encoder("odor").unwrap();
    for (row, value) in raw.column(odor).enumerate() {
        assert_eq!(encoder.transform(value), Some(table.values[(row, odor)]));
    }
}

#[test]
fn target_cells_must_equal_a_configured_value() {
    let dir = tempfile::tempdir().unwrap();
    for (name, body) in [
        ("upper.csv", "type,odor\np,p\nE,a\n"),
        ("named.csv", "type,odor\np,p\nedible,a\n"),
        ("padded.csv", "type,odor\np,p\n e,a\n"),
    ] {
        let config = write_csv(&dir, name, body);
        let err = load_dataset(&config).unwrap_err();
        assert!(
            matches!(err, ClassifierError::UnknownClass { row: 2, .. }),
            "{}: {:?}",
            name,
            err
        );
    }
}

#[test]
fn padded_feature_cells_keep_their_own_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "padded.csv", "type,odor\np,f\ne, f\np,f\n");
    let table = load_dataset(&config).unwrap();
    let odor: Vec<u32> = table.values.column(1).to_vec();
    assert_eq!(odor, vec![0, 1, 0]);
    assert_eq!(table.encoder("odor").unwrap().classes().len(), 2);
}

#[test]
fn custom_classes_and_target_column() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = write_csv(&dir, "custom.csv", "odor,class\np,bad\na,good\n");
    config.target_column = "class".to_string();
    config.classes = [ClassLabel::new("good", "good"), ClassLabel::new("bad", "bad")];
    let table = load_dataset(&config).unwrap();
    assert_eq!(table.values.column(1).to_vec(), vec![1, 0]);
}

#[test]
fn missing_file_is_a_read_error() {
    let config = DataConfig {
        path: "/nonexistent/mushrooms.csv".into(),
        ..DataConfig::default()
    };
    assert!(matches!(
        load_dataset(&config),
        Err(ClassifierError::Read { .. })
    ));
}

#[test]
fn missing_target_column_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "no_target.csv", "odor,habitat\np,u\na,g\n");
    assert!(matches!(
        load_dataset(&config),
        Err(ClassifierError::MissingColumn(_))
    ));
}

#[test]
fn header_only_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "empty.csv", "type,odor\n");
    assert!(load_dataset(&config).is_err());
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

#[test]
fn split_partitions_are_disjoint_and_cover_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "mushrooms.csv", MUSHROOMS);
    let table = load_dataset(&config).unwrap();
    let split = train_test_split(&table, "type", config.test_size, config.seed).unwrap();

    let train: HashSet<usize> = split.train_indices.iter().copied().collect();
    let test: HashSet<usize> = split.test_indices.iter().copied().collect();
    assert!(train.is_disjoint(&test));
    assert_eq!(train.len() + test.len(), table.nrows());
    assert_eq!(test.len(), 6);
    assert_eq!(train.len(), 14);

    assert_eq!(split.n_features(), 4);
    assert!(!split.feature_names.contains(&"type".to_string()));
    assert!(split.y_train.iter().chain(split.y_test.iter()).all(|&y| y <= 1));
}

#[test]
fn split_is_reproducible_for_a_seed() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "mushrooms.csv", MUSHROOMS);
    let table = load_dataset(&config).unwrap();

    let a = train_test_split(&table, "type", 0.3, 0).unwrap();
    let b = train_test_split(&table, "type", 0.3, 0).unwrap();
    assert_eq!(a.test_indices, b.test_indices);
    assert_eq!(a.x_test, b.x_test);
    assert_eq!(a.y_train, b.y_train);

    let c = train_test_split(&table, "type", 0.3, 1).unwrap();
    assert_eq!(c.test_indices.len(), a.test_indices.len());
}

#[test]
fn split_of_a_single_row_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_csv(&dir, "one.csv", "type,odor\np,f\n");
    let table = load_dataset(&config).unwrap();
    assert!(matches!(
        train_test_split(&table, "type", 0.3, 0),
        Err(ClassifierError::Split(_))
    ));
}
