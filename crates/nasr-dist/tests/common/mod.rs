//! Shared fixture builders for integration tests
//!
//! Rows are padded to the registry's column maps; keep the widths in sync
//! with `registry.rs` when editing.

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn apt_row(site: &str, site_type: &str, id: &str, name: &str, city: &str, state: &str) -> String {
    format!(
        "{:<3}{:<11}{:<2}{:<4}{:<30}{:<26}{:<2}",
        "APT", site, site_type, id, name, city, state
    )
}

pub fn att_row(site: &str, site_type: &str, sequence: &str, schedule: &str) -> String {
    format!(
        "{:<3}{:<11}{:<2}{:<2}{:<30}",
        "ATT", site, site_type, sequence, schedule
    )
}

pub fn rwy_row(site: &str, site_type: &str, runway: &str, length: &str, surface: &str) -> String {
    format!(
        "{:<3}{:<11}{:<2}{:<7}{:<5}{:<12}",
        "RWY", site, site_type, runway, length, surface
    )
}

pub fn rmk_row(site: &str, site_type: &str, element: &str, text: &str) -> String {
    format!(
        "{:<3}{:<11}{:<2}{:<13}{}",
        "RMK", site, site_type, element, text
    )
}

pub fn nav1_row(id: &str, nav_type: &str, name: &str, city: &str, state: &str) -> String {
    format!(
        "{:<4}{:<8}{:<20}{:<30}{:<26}{:<2}",
        "NAV1", id, nav_type, name, city, state
    )
}

pub fn nav2_row(id: &str, nav_type: &str, text: &str) -> String {
    format!("{:<4}{:<8}{:<20}{}", "NAV2", id, nav_type, text)
}

pub fn awy1_row(designator: &str, airway_type: &str) -> String {
    format!("{:<4}{:<5}{:<2}", "AWY1", designator, airway_type)
}

pub fn awy2_row(designator: &str, sequence: &str, point: &str) -> String {
    format!("{:<4}{:<5}{:<5}{:<30}", "AWY2", designator, sequence, point)
}

/// A fixed-width distribution directory with two airports, one navaid, one
/// airway, and one orphaned airport remark
pub fn write_fixed_fixture(dir: &Path) {
    let apt = [
        apt_row("04508.1", "A", "SPI", "SPRINGFIELD MUNI", "SPRINGFIELD", "IL"),
        att_row("04508.1", "A", "1", "ALL/ALL/0700-1900"),
        rwy_row("04508.1", "A", "04/22", "7999", "ASPH"),
        rmk_row("04508.1", "A", "A110-1", "DEER ON AND INVOF ARPT"),
        apt_row("19533.2", "H", "CHI9", "LAKESIDE HELI", "CHICAGO", "IL"),
        // Orphan: references a site that never appears as a base row.
        rmk_row("99999.9", "A", "A110-2", "RETIRED SITE"),
    ]
    .join("\r\n");
    std::fs::write(dir.join("APT.txt"), apt + "\r\n").unwrap();

    let nav = [
        nav1_row("CAP", "VORTAC", "CAPITAL", "SPRINGFIELD", "IL"),
        nav2_row("CAP", "VORTAC", "UNUSABLE BELOW 2500 FT"),
    ]
    .join("\r\n");
    std::fs::write(dir.join("NAV.txt"), nav + "\r\n").unwrap();

    let awy = [
        awy1_row("V4", "AR"),
        awy2_row("V4", "10", "CAP"),
        awy2_row("V4", "20", "JOT"),
    ]
    .join("\r\n");
    std::fs::write(dir.join("AWY.txt"), awy + "\r\n").unwrap();

    std::fs::write(
        dir.join("README.txt"),
        "National Airspace System Resources\r\nAIS subscriber files effective date December 28, 2023.\r\n",
    )
    .unwrap();
}

/// CSV files for the same two airports plus a fix, with one orphaned remark
pub fn csv_fixture_files() -> Vec<(&'static str, String)> {
    vec![
        (
            "APT_BASE.csv",
            [
                "SITE_NO,SITE_TYPE_CODE,ARPT_ID,ARPT_NAME,CITY,STATE_CODE",
                "04508.1,A,SPI,SPRINGFIELD MUNI,SPRINGFIELD,IL",
                "19533.2,H,CHI9,LAKESIDE HELI,CHICAGO,IL",
            ]
            .join("\r\n")
                + "\r\n",
        ),
        (
            "APT_RWY.csv",
            [
                "SITE_NO,SITE_TYPE_CODE,RWY_ID,RWY_LEN,SURFACE_TYPE_CODE",
                "04508.1,A,04/22,7999,ASPH",
            ]
            .join("\r\n")
                + "\r\n",
        ),
        (
            "APT_RMK.csv",
            [
                "SITE_NO,SITE_TYPE_CODE,REMARK_NO,REMARK",
                "04508.1,A,1,\"DEER ON AND INVOF ARPT\"",
                // Orphan: no such base site.
                "99999.9,A,2,RETIRED SITE",
            ]
            .join("\r\n")
                + "\r\n",
        ),
        (
            "NAV_BASE.csv",
            [
                "NAV_ID,NAV_TYPE,NAME,CITY,STATE_CODE",
                "CAP,VORTAC,CAPITAL,SPRINGFIELD,IL",
            ]
            .join("\r\n")
                + "\r\n",
        ),
        (
            "NAV_RMK.csv",
            [
                "NAV_ID,NAV_TYPE,REMARK_NO,REMARK",
                "CAP,VORTAC,1,UNUSABLE BELOW 2500 FT",
            ]
            .join("\r\n")
                + "\r\n",
        ),
        (
            "FIX_BASE.csv",
            [
                "FIX_ID,STATE_CODE,LAT_DECIMAL,LONG_DECIMAL",
                "BLOKR,IL,39.994,-89.528",
            ]
            .join("\r\n")
                + "\r\n",
        ),
    ]
}

/// Write the CSV fixture into a plain directory
pub fn write_csv_fixture(dir: &Path) {
    for (name, contents) in csv_fixture_files() {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}

/// Build a ZIP archive from named text entries
pub fn build_archive(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::FileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap();
}
