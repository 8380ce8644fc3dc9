#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Holds input files on disk for the lifetime of a test.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

/// Daily returns table with one row per value starting 2024-01-01.
pub fn returns_csv(values: &[f64]) -> String {
    let mut out = String::from("Date,Strategy\n");
    for (i, v) in values.iter().enumerate() {
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            + chrono::Duration::days(i as i64);
        out.push_str(&format!("{},{}\n", day, v));
    }
    out
}

pub const TRADES_CSV: &str = "\
Ticket,Symbol,Open Time,Close Time,Volume,Profit,Commission,Swap
1,EURUSD,2024.01.02 09:00:00,2024.01.02 11:00:00,1.0,120.0,-2.0,0.0
2,EURUSD,2024.01.03 09:00:00,2024.01.03 15:00:00,1.0,-80.0,-2.0,-0.5
3,GBPUSD,2024.01.04 09:00:00,2024.01.04 10:30:00,0.5,60.0,-1.0,0.0
4,GBPUSD,2024.01.05 09:00:00,2024.01.05 09:45:00,0.5,-40.0,-1.0,0.0
5,XAUUSD,2024.01.08 09:00:00,2024.01.08 17:00:00,0.2,90.0,-3.0,-1.0
";

pub const MT_HISTORY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<History>
  <Trade Ticket="10" Symbol="EURUSD" Type="buy" Volume="1" OpenPrice="1.10" ClosePrice="1.11"
         Profit="100" Commission="-2" Swap="0"
         OpenTime="2024-02-01 08:00:00" CloseTime="2024-02-01 12:00:00"/>
  <Trade Ticket="11" Symbol="EURUSD" Type="sell" Volume="1" OpenPrice="1.11" ClosePrice="1.115"
         Profit="-50" Commission="-2" Swap="-1"
         OpenTime="2024-02-02 08:00:00" CloseTime="2024-02-02 09:30:00"/>
  <Trade Ticket="12" Symbol="USDJPY" Type="buy" Volume="2" OpenPrice="150" ClosePrice="151"
         Profit="150" Commission="-4" Swap="0"
         OpenTime="2024-02-05 08:00:00" CloseTime="2024-02-06 08:00:00"/>
</History>
"#;
