//! PowerShell and `reg.exe` helpers shared by the detectors.

use posture::{run_probe_command, CommandOutput, CommandRunner, DetectionError, Result};
use serde::de::DeserializeOwned;

use crate::windows_cmd::{POWERSHELL_EXE, REG_EXE};

pub(crate) fn run_powershell(runner: &dyn CommandRunner, script: &str) -> Result<CommandOutput> {
    run_probe_command(
        runner,
        POWERSHELL_EXE,
        &["-NoProfile", "-NonInteractive", "-Command", script],
    )
}

/// `reg query <key> /v <value>`; `None` when the key or value is missing.
pub(crate) fn reg_query(
    runner: &dyn CommandRunner,
    key: &str,
    value_name: &str,
) -> Result<Option<String>> {
    let output = run_probe_command(runner, REG_EXE, &["query", key, "/v", value_name])?;
    Ok(output.success.then_some(output.stdout))
}

/// `reg query <key> /s /v <value>` across every subkey.
pub(crate) fn reg_query_recursive(
    runner: &dyn CommandRunner,
    key: &str,
    value_name: &str,
) -> Result<Option<String>> {
    let output = run_probe_command(runner, REG_EXE, &["query", key, "/s", "/v", value_name])?;
    Ok(output.success.then_some(output.stdout))
}

/// `ConvertTo-Json` emits a bare object for one row, an array for several,
/// and nothing at all for zero.
pub fn parse_json_rows<T: DeserializeOwned>(what: &'static str, text: &str) -> Result<Vec<T>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(text).map_err(|err| json_error(what, err))?;
    let rows = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Null => Vec::new(),
        other => vec![other],
    };
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|err| json_error(what, err)))
        .collect()
}

fn json_error(what: &'static str, err: serde_json::Error) -> DetectionError {
    DetectionError::parse(what, err.to_string())
}

pub fn parse_reg_dword(output: &str, value_name: &str) -> Option<u32> {
    parse_reg_dwords(output, value_name).into_iter().next()
}

/// Every `REG_DWORD` named `value_name` in (possibly recursive) query output.
pub fn parse_reg_dwords(output: &str, value_name: &str) -> Vec<u32> {
    parse_reg_lines(output, value_name)
        .filter(|(reg_type, _)| *reg_type == "REG_DWORD")
        .filter_map(|(_, value)| parse_dword(&value))
        .collect()
}

fn parse_dword(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse::<u32>().ok(),
    }
}

fn parse_reg_lines<'a>(
    output: &'a str,
    value_name: &'a str,
) -> impl Iterator<Item = (&'a str, String)> + 'a {
    output.lines().filter_map(move |line| {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        if !name.eq_ignore_ascii_case(value_name) {
            return None;
        }
        let reg_type = parts.next()?;
        let value = parts.collect::<Vec<_>>().join(" ");
        (!value.is_empty()).then_some((reg_type, value))
    })
}
