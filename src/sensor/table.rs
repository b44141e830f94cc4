//! Status-table rendering.
//!
//! Builds the fixed-width sensor table from the registry's sorted snapshot:
//! connected rows first (ascending logical ID), then vacant rows (ascending
//! physical index), always exactly [`MAX_SENSORS`] data rows. Appends an
//! advisory warning line listing any connected sensor whose stored ID byte
//! is outside the valid range; the warning never blocks rendering or the
//! workflows that follow.

use crate::config::ConsoleConfig;
use crate::io::CharIo;
use crate::sensor::{SensorAddress, SensorRecord, DISCONNECTED_C, MAX_SENSORS};
use core::fmt::Write as _;

const HEADER: &str =
    "| No | ID   | Address            | Temp     | High   | HighS | Low    | LowS  | Status |";
const RULE: &str =
    "|----|------|--------------------|----------|--------|-------|--------|-------|--------|";

/// Upper-threshold state for a reading: `-` when disconnected, `OVER` above
/// the limit, `ok` otherwise.
pub fn upper_state(temp: f32, limit: f32) -> &'static str {
    if temp == DISCONNECTED_C {
        "-"
    } else if temp > limit {
        "OVER"
    } else {
        "ok"
    }
}

/// Lower-threshold state for a reading: `-` when disconnected, `UNDER` below
/// the limit, `ok` otherwise.
pub fn lower_state(temp: f32, limit: f32) -> &'static str {
    if temp == DISCONNECTED_C {
        "-"
    } else if temp < limit {
        "UNDER"
    } else {
        "ok"
    }
}

/// Overall per-sensor status word: `FAULT` when the reading is the
/// disconnected sentinel, `ok` otherwise.
pub fn sensor_status(temp: f32) -> &'static str {
    if temp == DISCONNECTED_C { "FAULT" } else { "ok" }
}

fn fmt_address(addr: &SensorAddress) -> heapless::String<18> {
    let mut s = heapless::String::new();
    let _ = s.push_str("0x");
    for b in addr.iter() {
        let _ = write!(s, "{:02x}", b);
    }
    s
}

fn write_row<IO: CharIo, C: ConsoleConfig>(
    io: &mut IO,
    display_no: usize,
    row: &SensorRecord,
) -> Result<(), IO::Error> {
    let mut line: heapless::String<128> = heapless::String::new();

    if !row.connected {
        let _ = write!(
            line,
            "| {:>2} | NONE | {:<18} | {:<8} | {:<6} | {:<5} | {:<6} | {:<5} | {:<6} |",
            display_no, "-", "-", "-", "-", "-", "-", "n/c"
        );
        return io.write_line(line.as_str());
    }

    let mut id_field: heapless::String<4> = heapless::String::new();
    if row.id_in_range() {
        let _ = write!(id_field, "{}", row.logical_id);
    } else {
        let _ = id_field.push_str("ERR");
    }

    let mut temp_field: heapless::String<12> = heapless::String::new();
    if row.temperature_c == DISCONNECTED_C {
        let _ = temp_field.push('-');
    } else {
        let _ = write!(temp_field, "{:.1} C", row.temperature_c);
    }

    let mut high_field: heapless::String<12> = heapless::String::new();
    let _ = write!(high_field, "{:.1} C", C::UPPER_LIMIT_C);
    let mut low_field: heapless::String<12> = heapless::String::new();
    let _ = write!(low_field, "{:.1} C", C::LOWER_LIMIT_C);

    let _ = write!(
        line,
        "| {:>2} | {:<4} | {:<18} | {:<8} | {:<6} | {:<5} | {:<6} | {:<5} | {:<6} |",
        display_no,
        id_field.as_str(),
        fmt_address(&row.address).as_str(),
        temp_field.as_str(),
        high_field.as_str(),
        upper_state(row.temperature_c, C::UPPER_LIMIT_C),
        low_field.as_str(),
        lower_state(row.temperature_c, C::LOWER_LIMIT_C),
        sensor_status(row.temperature_c),
    );
    io.write_line(line.as_str())
}

/// Write the full status table for a sorted snapshot.
///
/// Rows must come from `SensorRegistry::sorted_rows()` after a fresh
/// `refresh_snapshot()`; this function only formats.
pub fn write_status_table<IO: CharIo, C: ConsoleConfig>(
    io: &mut IO,
    rows: &[SensorRecord; MAX_SENSORS],
) -> Result<(), IO::Error> {
    io.write_line(HEADER)?;
    io.write_line(RULE)?;

    for (i, row) in rows.iter().enumerate() {
        write_row::<IO, C>(io, i + 1, row)?;
    }

    // Out-of-range stored IDs are advisory: list them, keep going.
    let mut warning: heapless::String<256> = heapless::String::new();
    for (i, row) in rows.iter().enumerate() {
        if row.connected && !row.id_in_range() {
            if warning.is_empty() {
                let _ = warning.push_str("warning: sensor id out of range:");
            }
            let _ = write!(warning, " {}({})", i + 1, fmt_address(&row.address).as_str());
        }
    }
    if !warning.is_empty() {
        io.write_line(warning.as_str())?;
        io.write_line("re-assign the listed sensors from the ID menu (valid range 1-8)")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DefaultConfig;
    extern crate std;
    use std::string::String;
    use std::vec::Vec;

    struct CaptureIo {
        out: Vec<char>,
    }

    impl CaptureIo {
        fn new() -> Self {
            Self { out: Vec::new() }
        }
        fn output(&self) -> String {
            self.out.iter().collect()
        }
    }

    impl CharIo for CaptureIo {
        type Error = ();
        fn get_char(&mut self) -> Result<Option<char>, ()> {
            Ok(None)
        }
        fn put_char(&mut self, c: char) -> Result<(), ()> {
            self.out.push(c);
            Ok(())
        }
    }

    fn connected(display_slot: usize, id: u8, raw: u8, temp: f32) -> SensorRecord {
        SensorRecord {
            physical_index: display_slot,
            address: [0x28, 0, 0, 0, 0, 0, 0, display_slot as u8],
            logical_id: id,
            raw_id: raw,
            connected: true,
            temperature_c: temp,
        }
    }

    fn rows_with(connected_rows: &[SensorRecord]) -> [SensorRecord; MAX_SENSORS] {
        let mut rows = [SensorRecord::default(); MAX_SENSORS];
        for (i, slot) in rows.iter_mut().enumerate() {
            *slot = SensorRecord::vacant(i);
        }
        for (i, rec) in connected_rows.iter().enumerate() {
            rows[i] = *rec;
        }
        rows
    }

    #[test]
    fn threshold_states() {
        assert_eq!(upper_state(31.0, 30.0), "OVER");
        assert_eq!(upper_state(30.0, 30.0), "ok");
        assert_eq!(upper_state(DISCONNECTED_C, 30.0), "-");

        assert_eq!(lower_state(19.9, 20.0), "UNDER");
        assert_eq!(lower_state(20.0, 20.0), "ok");
        assert_eq!(lower_state(DISCONNECTED_C, 20.0), "-");

        assert_eq!(sensor_status(25.0), "ok");
        assert_eq!(sensor_status(DISCONNECTED_C), "FAULT");
    }

    #[test]
    fn table_has_header_and_exactly_max_rows() {
        let mut io = CaptureIo::new();
        let rows = rows_with(&[connected(0, 1, 1, 24.5)]);
        write_status_table::<_, DefaultConfig>(&mut io, &rows).unwrap();

        let out = io.output();
        assert!(out.contains("| No | ID   | Address"));
        // header + rule + 8 data rows
        assert_eq!(out.matches("\r\n").count(), 2 + MAX_SENSORS);
        assert_eq!(out.matches("NONE").count(), MAX_SENSORS - 1);
    }

    #[test]
    fn connected_row_shows_reading_and_thresholds() {
        let mut io = CaptureIo::new();
        let rows = rows_with(&[connected(0, 3, 3, 31.2)]);
        write_status_table::<_, DefaultConfig>(&mut io, &rows).unwrap();

        let out = io.output();
        assert!(out.contains("31.2 C"));
        assert!(out.contains("30.0 C"));
        assert!(out.contains("20.0 C"));
        assert!(out.contains("OVER"));
        assert!(out.contains("0x2800000000000000"));
    }

    #[test]
    fn faulted_reading_is_distinct_from_vacant_slot() {
        let mut io = CaptureIo::new();
        let rows = rows_with(&[connected(0, 1, 1, DISCONNECTED_C)]);
        write_status_table::<_, DefaultConfig>(&mut io, &rows).unwrap();

        let out = io.output();
        assert!(out.contains("FAULT"));
        assert!(out.contains("n/c"));
    }

    #[test]
    fn out_of_range_id_is_flagged_and_listed() {
        let mut io = CaptureIo::new();
        // effective ID fell back to the default, raw byte is garbage
        let rows = rows_with(&[connected(0, 1, 0x7f, 22.0)]);
        write_status_table::<_, DefaultConfig>(&mut io, &rows).unwrap();

        let out = io.output();
        assert!(out.contains("| ERR "));
        assert!(out.contains("warning: sensor id out of range: 1(0x2800000000000000)"));
    }

    #[test]
    fn clean_snapshot_has_no_warning() {
        let mut io = CaptureIo::new();
        let rows = rows_with(&[connected(0, 1, 1, 22.0)]);
        write_status_table::<_, DefaultConfig>(&mut io, &rows).unwrap();
        assert!(!io.output().contains("warning"));
    }
}
