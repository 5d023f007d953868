//! Decoding Sampler results into per-register counts.
//!
//! V2 results carry one hex sample per shot for every classical register.
//! Register widths come from the layout recorded at submission, then from
//! the service's `num_bits`, and only as a last resort from the samples.

use std::collections::HashMap;

use qec_hal::{Counts, ExecutionResult, join_register_bitstrings};

use crate::api::{ClassicalRegisterData, JobResultResponse};
use crate::error::{IbmError, IbmResult};

/// Classical registers of a circuit in declaration order, with widths.
pub type RegisterLayout = Vec<(String, usize)>;

/// Shots assumed when a quasi-distribution arrives with no shot count from
/// either the result metadata or the submission.
const DEFAULT_QUASI_SHOTS: u32 = 1024;

/// Decode a job result.
///
/// `layout` is the circuit's register layout and `submitted_shots` the shot
/// count sent with the job, when this process submitted it.
pub fn decode_results(
    results: &JobResultResponse,
    layout: Option<&[(String, usize)]>,
    submitted_shots: Option<u32>,
) -> IbmResult<ExecutionResult> {
    let pub_result = results
        .results
        .first()
        .ok_or_else(|| IbmError::MalformedResult("result contains no PUB".into()))?;

    let decoded = if let Some(data) = &pub_result.data {
        decode_samples(data, layout)?
    } else if let Some(raw) = &pub_result.counts {
        decode_aggregated(raw.iter().map(|(k, &v)| (k.as_str(), v)), layout)
    } else if let Some(dist) = pub_result.quasi_dists.as_ref().and_then(|d| d.first()) {
        #[allow(clippy::cast_precision_loss)]
        let shots = pub_result
            .metadata
            .as_ref()
            .and_then(|m| m.get("shots"))
            .and_then(serde_json::Value::as_u64)
            .or(submitted_shots.map(u64::from))
            .unwrap_or(u64::from(DEFAULT_QUASI_SHOTS)) as f64;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let counts = dist
            .iter()
            .map(|(k, &p)| (k.as_str(), (p * shots).max(0.0).round() as u64))
            .filter(|&(_, c)| c > 0);
        decode_aggregated(counts, layout)
    } else {
        return Err(IbmError::MalformedResult(
            "result has neither samples nor counts".into(),
        ));
    };

    Ok(match &pub_result.metadata {
        Some(metadata) => decoded.with_metadata(metadata.clone()),
        None => decoded,
    })
}

/// Decode V2 per-shot samples.
fn decode_samples(
    data: &HashMap<String, ClassicalRegisterData>,
    layout: Option<&[(String, usize)]>,
) -> IbmResult<ExecutionResult> {
    let registers: Vec<(&str, usize, &ClassicalRegisterData)> = match layout {
        Some(layout) => layout
            .iter()
            .map(|(name, width)| {
                data.get(name)
                    .map(|reg| (name.as_str(), *width, reg))
                    .ok_or_else(|| IbmError::MissingRegister(name.clone()))
            })
            .collect::<IbmResult<_>>()?,
        None => {
            let mut names: Vec<&String> = data.keys().collect();
            names.sort();
            names
                .into_iter()
                .map(|name| {
                    let reg = &data[name];
                    let width = reg
                        .num_bits
                        .unwrap_or_else(|| infer_bit_width(&reg.samples));
                    (name.as_str(), width, reg)
                })
                .collect()
        }
    };

    let shots = registers
        .iter()
        .map(|(_, _, reg)| reg.samples.len())
        .min()
        .unwrap_or(0);

    let mut counts = Counts::new();
    let mut per_register = vec![Counts::new(); registers.len()];
    for shot in 0..shots {
        let parts: Vec<String> = registers
            .iter()
            .map(|(_, width, reg)| hex_to_binary(&reg.samples[shot], *width))
            .collect();
        counts.insert(join_register_bitstrings(&parts), 1);
        for (reg_counts, part) in per_register.iter_mut().zip(parts) {
            reg_counts.insert(part, 1);
        }
    }

    let mut result = ExecutionResult::new(counts, u32::try_from(shots).unwrap_or(u32::MAX));
    for ((name, _, _), reg_counts) in registers.iter().zip(per_register) {
        result = result.with_register_counts(*name, reg_counts);
    }
    Ok(result)
}

/// Decode V1 aggregated counts keyed by the integer value of all bits.
///
/// With a layout the value is split into registers, first declared register
/// in the low bits. Without one only combined counts are produced.
fn decode_aggregated<'a>(
    entries: impl Iterator<Item = (&'a str, u64)>,
    layout: Option<&[(String, usize)]>,
) -> ExecutionResult {
    let mut counts = Counts::new();
    let mut per_register = vec![Counts::new(); layout.map_or(0, <[_]>::len)];

    for (key, count) in entries {
        match (layout, parse_outcome(key)) {
            (Some(layout), Some(value)) => {
                let parts = split_value(value, layout);
                counts.insert(join_register_bitstrings(&parts), count);
                for (reg_counts, part) in per_register.iter_mut().zip(parts) {
                    reg_counts.insert(part, count);
                }
            }
            _ => counts.insert(hex_to_binary(key, 0), count),
        }
    }

    let shots = u32::try_from(counts.total_shots()).unwrap_or(u32::MAX);
    let mut result = ExecutionResult::new(counts, shots);
    if let Some(layout) = layout {
        for ((name, _), reg_counts) in layout.iter().zip(per_register) {
            result = result.with_register_counts(name.clone(), reg_counts);
        }
    }
    result
}

/// Parse an outcome key: `0x`-prefixed hex, a plain binary string, or bare hex.
fn parse_outcome(key: &str) -> Option<u64> {
    if let Some(hex) = key.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if !key.is_empty() && key.chars().all(|c| c == '0' || c == '1') {
        u64::from_str_radix(key, 2).ok()
    } else {
        u64::from_str_radix(key, 16).ok()
    }
}

/// Split an integer outcome into per-register bitstrings.
pub(crate) fn split_value(value: u64, layout: &[(String, usize)]) -> Vec<String> {
    let mut offset = 0u32;
    layout
        .iter()
        .map(|&(_, width)| {
            let width_bits = u32::try_from(width).unwrap_or(u32::MAX);
            let mask = if width_bits >= 64 {
                u64::MAX
            } else {
                (1u64 << width_bits) - 1
            };
            let part = value.checked_shr(offset).unwrap_or(0) & mask;
            offset = offset.saturating_add(width_bits);
            format!("{part:0width$b}")
        })
        .collect()
}

/// Infer a register width from its samples: the bit length of the largest
/// value, at least 1.
pub(crate) fn infer_bit_width(samples: &[String]) -> usize {
    let max_val = samples
        .iter()
        .filter_map(|s| u64::from_str_radix(s.strip_prefix("0x").unwrap_or(s), 16).ok())
        .max()
        .unwrap_or(0);
    if max_val == 0 {
        1
    } else {
        64 - max_val.leading_zeros() as usize
    }
}

/// Convert a hex sample to a binary string padded to `width`.
///
/// A `width` of 0 falls back to four bits per hex digit. Input that is not
/// hex is returned unchanged.
pub(crate) fn hex_to_binary(hex: &str, width: usize) -> String {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    match u64::from_str_radix(hex, 16) {
        Ok(value) => {
            let width = if width > 0 { width } else { hex.len() * 4 };
            format!("{value:0width$b}")
        }
        Err(_) => hex.to_string(),
    }
}
