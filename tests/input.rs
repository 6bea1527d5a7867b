use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use kira_biosample::domain::{BioSampleId, InputFormat};
use kira_biosample::error::KiraError;
use kira_biosample::input::read_identifiers;

fn write_input(dir: &tempfile::TempDir, name: &str, content: &str) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
    fs::write(path.as_std_path(), content).unwrap();
    path
}

fn ids(values: &[&str]) -> Vec<BioSampleId> {
    values.iter().map(|value| BioSampleId::from(*value)).collect()
}

#[test]
fn text_input_skips_blank_lines_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_input(
        &temp,
        "ids.txt",
        "SAMN00000003\n\n  SAMN00000001  \n   \nSAMN00000002\nSAMN00000001\n",
    );

    let read = read_identifiers(&path, None).unwrap();
    assert_eq!(
        read,
        ids(&["SAMN00000003", "SAMN00000001", "SAMN00000002", "SAMN00000001"])
    );
}

#[test]
fn csv_input_uses_first_column_only() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_input(
        &temp,
        "samples.csv",
        "biosample,site,depth\nSAMN00000001,gut,10\nSAMN00000002,skin\n12345,oral,3,extra\n",
    );

    let read = read_identifiers(&path, None).unwrap();
    assert_eq!(read, ids(&["SAMN00000001", "SAMN00000002", "12345"]));
}

#[test]
fn tsv_input_uses_tab_delimiter() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_input(
        &temp,
        "samples.tsv",
        "accession\tnote\nSAMN00000001\ta, b\nSAMN00000002\tc\n",
    );

    let read = read_identifiers(&path, None).unwrap();
    assert_eq!(read, ids(&["SAMN00000001", "SAMN00000002"]));
}

#[test]
fn format_override_beats_extension() {
    let temp = tempfile::tempdir().unwrap();
    let path = write_input(&temp, "samples.txt", "id,site\nSAMN00000001,gut\n");

    let as_text = read_identifiers(&path, None).unwrap();
    assert_eq!(as_text, ids(&["id,site", "SAMN00000001,gut"]));

    let as_csv = read_identifiers(&path, Some(InputFormat::Csv)).unwrap();
    assert_eq!(as_csv, ids(&["SAMN00000001"]));
}

#[test]
fn missing_input_is_filesystem_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("absent.txt")).unwrap();
    let err = read_identifiers(&path, None).unwrap_err();
    assert_matches!(err, KiraError::Filesystem(_));
}
