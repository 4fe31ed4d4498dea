use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::coeffs::parse_coeffs;
use super::meta::{MetaField, parse_file_meta};
use super::{InputError, discover_coeff_files, load_inputs};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("maass_lstab_input_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn parse_str(text: &str) -> Vec<f64> {
    parse_coeffs(Cursor::new(text.as_bytes()))
}

#[test]
fn test_parse_coeffs_gap_fill() {
    let a = parse_str("1 1.0\n3 0.5\n");
    assert_eq!(a, vec![1.0, 0.0, 0.5]);
}

#[test]
fn test_parse_coeffs_skips_malformed_lines() {
    let a = parse_str("garbage\n1 1.0\n2\nx 9.0\n2 not_a_number\n0 3.0\n3 -2.5e-1\n");
    assert_eq!(a, vec![1.0, 0.0, -0.25]);
}

#[test]
fn test_parse_coeffs_empty_and_unparseable() {
    assert!(parse_str("").is_empty());
    assert!(parse_str("only junk\nhere too\n").is_empty());
}

#[test]
fn test_parse_coeffs_round_trip() {
    let original = vec![1.0, -0.3713916491, 0.0, 2.25e-8, -17.5];
    let mut text = String::new();
    for (i, v) in original.iter().enumerate() {
        text.push_str(&format!("{} {}\n", i + 1, v));
    }
    assert_eq!(parse_str(&text), original);
}

#[test]
fn test_parse_coeffs_exponential_notation() {
    let a = parse_str("1 1.0\n2 3.5e-12\n");
    assert_eq!(a, vec![1.0, 3.5e-12]);
}

#[test]
fn test_discover_missing_dir_is_fatal() {
    let dir = make_temp_dir().join("does_not_exist");
    match discover_coeff_files(&dir) {
        Err(InputError::MissingInput(_)) => {}
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn test_discover_sorted_and_filtered() {
    let dir = make_temp_dir();
    let sub = dir.join("R_030");
    fs::create_dir_all(&sub).unwrap();
    fs::write(dir.join("coeffs_R_031.000000000000_Y_0.020.txt"), "1 1.0\n").unwrap();
    fs::write(sub.join("coeffs_R_030.000000000000_Y_0.020.txt"), "1 1.0\n").unwrap();
    fs::write(dir.join("notes.txt"), "not a dump\n").unwrap();
    fs::write(dir.join("coeffs_binary.dat"), "1 1.0\n").unwrap();

    let found = discover_coeff_files(&dir).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[0] < found[1]);
    assert!(
        found
            .iter()
            .all(|p| p.file_name().unwrap().to_string_lossy().starts_with("coeffs_"))
    );
}

#[test]
fn test_load_inputs_skips_empty_file() {
    let dir = make_temp_dir();
    fs::write(dir.join("coeffs_R_030.000000000000_Y_0.020.txt"), "1 1.0\n2 0.5\n").unwrap();
    fs::write(dir.join("coeffs_R_031.000000000000_Y_0.020.txt"), "junk only\n").unwrap();

    let files = load_inputs(&dir).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].coeffs, vec![1.0, 0.5]);
    assert_eq!(files[0].m(), 2);
}

#[cfg(unix)]
#[test]
fn test_load_inputs_skips_unreadable_file() {
    let dir = make_temp_dir();
    fs::write(dir.join("coeffs_R_030.000000000000_Y_0.020.txt"), "1 1.0\n2 0.5\n").unwrap();
    // A dangling symlink opens with an error; the run must survive it.
    std::os::unix::fs::symlink(
        dir.join("missing_target.txt"),
        dir.join("coeffs_R_031.000000000000_Y_0.020.txt"),
    )
    .unwrap();

    let files = load_inputs(&dir).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].coeffs, vec![1.0, 0.5]);
}

#[test]
fn test_load_inputs_all_empty_is_fatal() {
    let dir = make_temp_dir();
    fs::write(dir.join("coeffs_R_030.000000000000_Y_0.020.txt"), "junk\n").unwrap();
    match load_inputs(&dir) {
        Err(InputError::NoUsableInput(_)) => {}
        other => panic!("expected NoUsableInput, got {other:?}"),
    }
}

#[test]
fn test_load_inputs_no_files_is_fatal() {
    let dir = make_temp_dir();
    match load_inputs(&dir) {
        Err(InputError::NoUsableInput(_)) => {}
        other => panic!("expected NoUsableInput, got {other:?}"),
    }
}

#[test]
fn test_meta_full_grammar() {
    let meta = parse_file_meta("coeffs_R_030.279048499140_Y_0.020.txt");
    match &meta.r {
        MetaField::Parsed { token, value } => {
            assert_eq!(token, "030.279048499140");
            assert!((value - 30.279048499140).abs() < 1e-15);
        }
        MetaField::Unparsed => panic!("R should parse"),
    }
    match &meta.y {
        MetaField::Parsed { token, value } => {
            assert_eq!(token, "0.020");
            assert!((value - 0.020).abs() < 1e-15);
        }
        MetaField::Unparsed => panic!("Y should parse"),
    }
}

#[test]
fn test_meta_fields_fail_independently() {
    let meta = parse_file_meta("coeffs_R_030.500000000000_Y_zz.txt");
    assert!(meta.r.token().is_some());
    assert_eq!(meta.y, MetaField::Unparsed);
    assert!(meta.y.value_or_nan().is_nan());

    let meta = parse_file_meta("coeffs_R_zz_Y_0.020.txt");
    assert_eq!(meta.r, MetaField::Unparsed);
    assert!(meta.r.value_or_nan().is_nan());
    assert!(meta.y.token().is_some());
}

#[test]
fn test_meta_rejects_wrong_shape() {
    for name in [
        "coeffs_030.5_0.020.txt",
        "coeffs_R_030.5_Y_0.020.dat",
        "something_R_030.5_Y_0.020.txt",
        "coeffs_R__Y_0.020.txt",
    ] {
        let meta = parse_file_meta(name);
        assert_eq!(meta.r, MetaField::Unparsed, "name {name}");
    }
}
