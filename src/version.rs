//! Promotion/demotion between wire versions and the in-memory (v8) object
//! shape.
//!
//! Grounded on `original_source/Version3/FrAdcData.hh`,
//! `Version4/FrAdcData.hh`, `Version6/FrAdcData.hh` and
//! `Version8/FrAdcData.hh`: `crate`+`channel` collapse into
//! `channelGroup`+`channelNumber`, `overRange` renames to `dataValid`,
//! `timeOffsetS`+`timeOffsetN` collapse into one `f64 timeOffset`, and
//! `phase` is introduced at v8 with no older counterpart.
//!
//! Objects are promoted to the current in-memory shape immediately on read,
//! before they are declared in the dictionary — so the dictionary's
//! `(class, instance)` keys, read in the wire's own per-version numbering,
//! always resolve to an already-promoted object. This sidesteps needing a
//! separate "rewrite the resolver queue after promotion" pass.

use crate::kind::Version;
use crate::model::{FrAdcData, FrAdcDataLegacy};

/// v3/v4/v6 -> v8.
pub fn promote_adc_data(legacy: FrAdcDataLegacy, _from: Version) -> FrAdcData {
    FrAdcData {
        name: legacy.name,
        comment: legacy.comment,
        channel_group: legacy.crate_num as u32,
        channel_number: legacy.channel as u32,
        n_bits: legacy.n_bits,
        bias: legacy.bias,
        slope: legacy.slope,
        units: legacy.units,
        sample_rate: legacy.sample_rate,
        time_offset: legacy.time_offset_s as f64 + legacy.time_offset_n as f64 * 1e-9,
        f_shift: legacy.f_shift,
        phase: 0.0,
        data_valid: legacy.over_range,
        data: legacy.data,
        aux: legacy.aux,
    }
}

/// v8 -> v3/v4/v6. `phase` has no older representation and is dropped
/// silently (it carries no wire meaning before v8, unlike a value that
/// would be truncated); a non-default `channelGroup`/`channelNumber` that
/// cannot round-trip through the legacy `u16` width is rejected rather than
/// silently wrapped.
pub fn demote_adc_data(current: &FrAdcData, _to: Version) -> crate::error::Result<FrAdcDataLegacy> {
    use crate::error::Error;

    let crate_num: u16 = current
        .channel_group
        .try_into()
        .map_err(|_| Error::LossyDemote(format!("channelGroup {} does not fit in legacy crate field", current.channel_group)))?;
    let channel: u16 = current
        .channel_number
        .try_into()
        .map_err(|_| Error::LossyDemote(format!("channelNumber {} does not fit in legacy channel field", current.channel_number)))?;

    let time_offset_s = current.time_offset.trunc() as u32;
    let time_offset_n = ((current.time_offset.fract()) * 1e9).round() as u32;

    Ok(FrAdcDataLegacy {
        name: current.name.clone(),
        comment: current.comment.clone(),
        crate_num,
        channel,
        n_bits: current.n_bits,
        bias: current.bias,
        slope: current.slope,
        units: current.units.clone(),
        sample_rate: current.sample_rate,
        time_offset_s,
        time_offset_n,
        f_shift: current.f_shift,
        over_range: current.data_valid,
        data: current.data.clone(),
        aux: current.aux.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_legacy() -> FrAdcDataLegacy {
        FrAdcDataLegacy {
            name: "H1:LSC-DARM_ERR".into(),
            comment: "".into(),
            crate_num: 7,
            channel: 3,
            n_bits: 16,
            bias: 0.0,
            slope: 1.0,
            units: "counts".into(),
            sample_rate: 16384.0,
            time_offset_s: 1,
            time_offset_n: 500_000_000,
            f_shift: 0.0,
            over_range: 0,
            data: Vec::new(),
            aux: Vec::new(),
        }
    }

    #[test]
    fn promote_merges_crate_channel_and_time_offset() {
        let promoted = promote_adc_data(sample_legacy(), Version::V3);
        assert_eq!(promoted.channel_group, 7);
        assert_eq!(promoted.channel_number, 3);
        assert!((promoted.time_offset - 1.5).abs() < 1e-9);
        assert_eq!(promoted.phase, 0.0);
        assert_eq!(promoted.data_valid, 0);
    }

    #[test]
    fn promote_then_demote_round_trips_within_legacy_precision() {
        let legacy = sample_legacy();
        let promoted = promote_adc_data(legacy.clone(), Version::V3);
        let demoted = demote_adc_data(&promoted, Version::V3).unwrap();
        assert_eq!(demoted.crate_num, legacy.crate_num);
        assert_eq!(demoted.channel, legacy.channel);
        assert_eq!(demoted.time_offset_s, legacy.time_offset_s);
        assert_eq!(demoted.time_offset_n, legacy.time_offset_n);
    }

    #[test]
    fn demote_rejects_channel_group_outside_legacy_width() {
        let mut promoted = promote_adc_data(sample_legacy(), Version::V3);
        promoted.channel_group = 70_000; // doesn't fit in u16
        let err = demote_adc_data(&promoted, Version::V3).unwrap_err();
        assert!(matches!(err, crate::error::Error::LossyDemote(_)));
    }
}
