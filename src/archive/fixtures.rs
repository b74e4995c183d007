// Thu Oct 15 2026 - Alex

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

pub fn write_zip(path: &Path, files: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for (name, contents) in files {
        writer.start_file(*name, FileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// Archive shaped like a portal tariff export: `<archive_entity>_TL.zip`
/// holding a duty details report whose first row names `reporter`.
pub fn write_report_archive(dir: &Path, archive_entity: &str, report_entity: &str, reporter: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(format!("{}_TL.zip", archive_entity));
    let report = format!(
        "Reporter\tYear\tProduct\tDuty\n{}\t2021\t010121\t0.0\n{}\t2021\t010129\t2.5\n",
        reporter, reporter
    );
    let report_name = format!("{}_DutyDetails_TL.txt", report_entity);
    write_zip(&path, &[(report_name.as_str(), report.as_str())]);
    path
}
