// On-disk layout of scattered conversions: fragment naming and sizing,
// metadata routing, and padding behavior at the boundaries.

mod common;

use std::fs;

use bytes::Bytes;
use parquet::file::reader::{FileReader, SerializedFileReader};

use common::{concat_view, fragment_names, max_rows, small_config, write_dump};
use particles2parquet::pipeline::convert_file;

/// Footer parse of the standalone metadata file (row data lives elsewhere).
fn metadata_row_groups(dir: &std::path::Path) -> usize {
    let bytes = fs::read(dir.join("metadata")).unwrap();
    assert_eq!(&bytes[..4], b"PAR1");
    let reader = SerializedFileReader::new(Bytes::from(bytes)).unwrap();
    reader.metadata().num_row_groups()
}

#[test]
fn one_row_group_fills_one_padded_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config();
    let input = dir.path().join("dump.bin");
    let output = dir.path().join("dump.parquet");
    write_dump(&input, max_rows(&config));

    let summary = convert_file(&config, &input, &output).unwrap();
    assert_eq!(summary.row_groups, 1);

    assert_eq!(fragment_names(&output), vec!["rgb-0000000000"]);
    let fragment = fs::read(output.join("rgb-0000000000")).unwrap();
    assert_eq!(fragment.len() as u64, config.scatter.fragment_size);
    // One 64 KiB sub-file, scatter-padded to the full fragment.
    assert_eq!(&fragment[..4], b"PAR1");
    assert_eq!(&fragment[(64 << 10) - 4..64 << 10], b"PAR1");
    assert!(fragment[64 << 10..].iter().all(|&b| b == 0));
    assert_eq!(metadata_row_groups(&output), 1);
}

#[test]
fn four_row_groups_share_one_exact_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config();
    let input = dir.path().join("dump.bin");
    let output = dir.path().join("dump.parquet");
    write_dump(&input, 4 * max_rows(&config));

    let summary = convert_file(&config, &input, &output).unwrap();
    assert_eq!(summary.row_groups, 4);

    assert_eq!(fragment_names(&output), vec!["rgb-0000000000"]);
    let fragment_len = fs::metadata(output.join("rgb-0000000000")).unwrap().len();
    assert_eq!(fragment_len, config.scatter.fragment_size);
    assert_eq!(metadata_row_groups(&output), 4);
}

#[test]
fn row_group_past_the_fragment_opens_a_second_one() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config();
    let input = dir.path().join("dump.bin");
    let output = dir.path().join("dump.parquet");
    write_dump(&input, 4 * max_rows(&config) + 1);

    let summary = convert_file(&config, &input, &output).unwrap();
    assert_eq!(summary.row_groups, 5);

    assert_eq!(
        fragment_names(&output),
        vec!["rgb-0000000000", "rgb-0000262144"]
    );
    // The trailing fragment holds one row group and is padded out.
    let second = fs::read(output.join("rgb-0000262144")).unwrap();
    assert_eq!(second.len() as u64, config.scatter.fragment_size);
    assert_eq!(metadata_row_groups(&output), 5);

    // The reassembled stream reads back whole.
    let reader = SerializedFileReader::new(Bytes::from(concat_view(&output))).unwrap();
    assert_eq!(
        reader.metadata().file_metadata().num_rows() as u64,
        4 * max_rows(&config) + 1
    );
}

#[test]
fn skip_padding_keeps_fragments_at_true_length() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = small_config();
    config.writer.skip_padding = true;
    config.scatter.skip_padding = true;
    let input = dir.path().join("dump.bin");
    let output = dir.path().join("dump.parquet");
    write_dump(&input, 1);

    convert_file(&config, &input, &output).unwrap();

    let names = fragment_names(&output);
    assert_eq!(names.len(), 1);
    let fragment_len = fs::metadata(output.join(&names[0])).unwrap().len();
    assert!(fragment_len > 0 && fragment_len < config.scatter.fragment_size);

    // Unpadded row group, but the stream still reads back.
    let reader = SerializedFileReader::new(Bytes::from(concat_view(&output))).unwrap();
    assert_eq!(reader.metadata().num_row_groups(), 1);
    assert_eq!(reader.metadata().file_metadata().num_rows(), 1);
}

#[test]
fn empty_dump_leaves_only_the_metadata_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config();
    let input = dir.path().join("dump.bin");
    let output = dir.path().join("dump.parquet");
    write_dump(&input, 0);

    let summary = convert_file(&config, &input, &output).unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.row_groups, 0);

    assert!(fragment_names(&output).is_empty());
    assert_eq!(metadata_row_groups(&output), 0);
}

#[test]
fn default_sizes_produce_a_one_mib_sub_file_in_a_four_mib_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let config = particles2parquet::ConvertConfig::default();
    let input = dir.path().join("dump.bin");
    let output = dir.path().join("dump.parquet");
    write_dump(&input, max_rows(&config));
    assert_eq!(max_rows(&config), 43_520);

    let summary = convert_file(&config, &input, &output).unwrap();
    assert_eq!(summary.row_groups, 1);

    let fragment = fs::read(output.join("rgb-0000000000")).unwrap();
    assert_eq!(fragment.len(), 4 << 20);
    assert_eq!(&fragment[..4], b"PAR1");
    // The sub-file footer sits flush at the 1 MiB row-group boundary.
    assert_eq!(&fragment[(1 << 20) - 4..1 << 20], b"PAR1");
    let sub_file = Bytes::copy_from_slice(&fragment[..1 << 20]);
    let reader = SerializedFileReader::new(sub_file).unwrap();
    assert_eq!(reader.metadata().file_metadata().num_rows(), 43_520);
}
