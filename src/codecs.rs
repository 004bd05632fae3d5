//! Per-kind wire codecs: the `read`/`write`/`size_of` function bodies the
//! registry (`src/registry.rs`) wires into its [`crate::registry::KindDescriptor`]
//! table.
//!
//! Grounded on `framecpp`'s per-version `FrAdcData.hh`/`FrameH.hh` field
//! lists and on the teacher's `frame::header` style of free functions built
//! on explicit read/write helpers rather than a derive macro — there is no
//! single wire layout uniform enough across 17 kinds to generate.
//!
//! Every `read_*` returns the fully-formed [`Kind`] with scalar fields set
//! and pointer/list fields still empty, plus a list of [`PendingSlot`]
//! describing how to fill those fields in once the referenced objects are
//! known. `src/stream/input.rs` is the only thing that turns a
//! `PendingSlot` into a [`crate::resolver::Patch`] — it is the one place
//! that knows the object's freshly assigned [`ObjIndex`].

use crate::arena::ObjIndex;
use crate::checksum::ChecksumKind;
use crate::codec::{ByteOrder, PrimRead, PrimWrite};
use crate::dictionary::{Dictionary, WireRef, NULL_REF};
use crate::error::{Error, Result};
use crate::kind::{KindId, Version};
use crate::model::*;

/// A field of a freshly decoded [`Kind`] that still needs to be filled in
/// once its target(s) have been read and assigned an [`ObjIndex`].
pub enum PendingSlot {
    Single { target: WireRef, target_kind: KindId, set: Box<dyn FnOnce(&mut Kind, ObjIndex)> },
    List { head: WireRef, element_kind: KindId, set: Box<dyn FnOnce(&mut Kind, Vec<ObjIndex>)> },
}

impl PendingSlot {
    fn single(
        target: WireRef,
        target_kind: KindId,
        set: impl FnOnce(&mut Kind, ObjIndex) + 'static,
    ) -> Option<PendingSlot> {
        if target == NULL_REF {
            None
        } else {
            Some(PendingSlot::Single { target, target_kind, set: Box::new(set) })
        }
    }

    fn list(
        head: WireRef,
        element_kind: KindId,
        set: impl FnOnce(&mut Kind, Vec<ObjIndex>) + 'static,
    ) -> PendingSlot {
        PendingSlot::List { head, element_kind, set: Box::new(set) }
    }
}

pub fn read_wire_ref(r: &mut dyn PrimRead, order: ByteOrder) -> Result<WireRef> {
    let class = r.read_u16(order)?;
    let instance = r.read_u32(order)?;
    Ok((class, instance))
}

pub fn write_wire_ref(w: &mut dyn PrimWrite, order: ByteOrder, wr: WireRef) -> Result<()> {
    w.write_u16(order, wr.0)?;
    w.write_u32(order, wr.1)
}

fn wire_ref_of(dict: &Dictionary, target: Option<ObjIndex>) -> WireRef {
    target.and_then(|idx| dict.wire_ref_of(idx)).unwrap_or(NULL_REF)
}

fn wire_ref_list_head(dict: &Dictionary, list: &[ObjIndex]) -> WireRef {
    list.first().and_then(|&idx| dict.wire_ref_of(idx)).unwrap_or(NULL_REF)
}

// ---------------------------------------------------------------- FrSH/FrSE

pub fn read_fr_sh(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let class = r.read_u32(order)?;
    let comment = r.read_string16(order)?;
    Ok((Kind::FrSH(FrSH { name, class, comment }), Vec::new()))
}

pub fn write_fr_sh(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let s = expect_fr_sh(k)?;
    w.write_string16(order, &s.name)?;
    w.write_u32(order, s.class)?;
    w.write_string16(order, &s.comment)
}

pub fn size_fr_sh(k: &Kind) -> u64 {
    let s = expect_fr_sh(k).expect("size_of called on mismatched kind");
    string_size16(&s.name) + 4 + string_size16(&s.comment)
}

fn expect_fr_sh(k: &Kind) -> Result<&FrSH> {
    match k {
        Kind::FrSH(s) => Ok(s),
        _ => Err(Error::InvalidFrameStructure("expected FrSH".into())),
    }
}

pub fn read_fr_se(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let field_type = r.read_string16(order)?;
    Ok((Kind::FrSE(FrSE { name, comment, field_type }), Vec::new()))
}

pub fn write_fr_se(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let s = match k {
        Kind::FrSE(s) => s,
        _ => return Err(Error::InvalidFrameStructure("expected FrSE".into())),
    };
    w.write_string16(order, &s.name)?;
    w.write_string16(order, &s.comment)?;
    w.write_string16(order, &s.field_type)
}

pub fn size_fr_se(k: &Kind) -> u64 {
    match k {
        Kind::FrSE(s) => string_size16(&s.name) + string_size16(&s.comment) + string_size16(&s.field_type),
        _ => 0,
    }
}

// ------------------------------------------------------------------ FrameH

pub fn read_frame_h(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let run = r.read_i32(order)?;
    let frame = r.read_u32(order)?;
    let data_quality = r.read_u32(order)?;
    let gtime = GpsTime { seconds: r.read_u32(order)?, nanoseconds: r.read_u32(order)? };
    let uleaps = r.read_i32(order)?;
    let dt = r.read_f64(order)?;

    let raw_data_ref = read_wire_ref(r, order)?;
    let types_head = read_wire_ref(r, order)?;
    let user_head = read_wire_ref(r, order)?;
    let detect_sim_head = read_wire_ref(r, order)?;
    let detect_proc_head = read_wire_ref(r, order)?;
    let history_head = read_wire_ref(r, order)?;
    let proc_data_head = read_wire_ref(r, order)?;
    let sim_data_head = read_wire_ref(r, order)?;
    let event_head = read_wire_ref(r, order)?;
    let sim_event_head = read_wire_ref(r, order)?;
    let summary_data_head = read_wire_ref(r, order)?;
    let aux_data_head = read_wire_ref(r, order)?;
    let aux_table_head = read_wire_ref(r, order)?;

    let kind = Kind::FrameH(FrameH { name, run, frame, data_quality, gtime, uleaps, dt, ..Default::default() });

    let mut slots = Vec::new();
    if let Some(s) = PendingSlot::single(raw_data_ref, KindId::FrRawData, |k, idx| {
        k.as_frame_h_mut().unwrap().raw_data = Some(idx);
    }) {
        slots.push(s);
    }
    slots.push(PendingSlot::list(types_head, KindId::FrSH, |k, list| k.as_frame_h_mut().unwrap().types = list));
    slots.push(PendingSlot::list(user_head, KindId::FrTable, |k, list| k.as_frame_h_mut().unwrap().user = list));
    slots.push(PendingSlot::list(detect_sim_head, KindId::FrDetector, |k, list| {
        k.as_frame_h_mut().unwrap().detect_sim = list
    }));
    slots.push(PendingSlot::list(detect_proc_head, KindId::FrDetector, |k, list| {
        k.as_frame_h_mut().unwrap().detect_proc = list
    }));
    slots.push(PendingSlot::list(history_head, KindId::FrHistory, |k, list| {
        k.as_frame_h_mut().unwrap().history = list
    }));
    slots.push(PendingSlot::list(proc_data_head, KindId::FrProcData, |k, list| {
        k.as_frame_h_mut().unwrap().proc_data = list
    }));
    slots.push(PendingSlot::list(sim_data_head, KindId::FrSimData, |k, list| {
        k.as_frame_h_mut().unwrap().sim_data = list
    }));
    slots.push(PendingSlot::list(event_head, KindId::FrEvent, |k, list| k.as_frame_h_mut().unwrap().event = list));
    slots.push(PendingSlot::list(sim_event_head, KindId::FrSimEvent, |k, list| {
        k.as_frame_h_mut().unwrap().sim_event = list
    }));
    slots.push(PendingSlot::list(summary_data_head, KindId::FrSummary, |k, list| {
        k.as_frame_h_mut().unwrap().summary_data = list
    }));
    slots.push(PendingSlot::list(aux_data_head, KindId::FrVect, |k, list| {
        k.as_frame_h_mut().unwrap().aux_data = list
    }));
    slots.push(PendingSlot::list(aux_table_head, KindId::FrTable, |k, list| {
        k.as_frame_h_mut().unwrap().aux_table = list
    }));

    Ok((kind, slots))
}

pub fn write_frame_h(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let f = k.as_frame_h().ok_or_else(|| Error::InvalidFrameStructure("expected FrameH".into()))?;
    w.write_string16(order, &f.name)?;
    w.write_i32(order, f.run)?;
    w.write_u32(order, f.frame)?;
    w.write_u32(order, f.data_quality)?;
    w.write_u32(order, f.gtime.seconds)?;
    w.write_u32(order, f.gtime.nanoseconds)?;
    w.write_i32(order, f.uleaps)?;
    w.write_f64(order, f.dt)?;

    write_wire_ref(w, order, wire_ref_of(dict, f.raw_data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.types))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.user))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.detect_sim))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.detect_proc))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.history))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.proc_data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.sim_data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.event))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.sim_event))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.summary_data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.aux_data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &f.aux_table))
}

pub fn size_frame_h(k: &Kind) -> u64 {
    let f = k.as_frame_h().expect("size_of called on mismatched kind");
    string_size16(&f.name) + 4 + 4 + 4 + 4 + 4 + 4 + 8 + 13 * 6
}

// ---------------------------------------------------------------- FrRawData

pub fn read_raw_data(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let first_ser_head = read_wire_ref(r, order)?;
    let first_adc_head = read_wire_ref(r, order)?;
    let first_table_head = read_wire_ref(r, order)?;
    let first_msg_head = read_wire_ref(r, order)?;
    let first_misc_head = read_wire_ref(r, order)?;

    let kind = Kind::FrRawData(FrRawData { name, ..Default::default() });
    let slots = vec![
        PendingSlot::list(first_ser_head, KindId::FrVect, |k, list| {
            if let Kind::FrRawData(r) = k {
                r.first_ser = list
            }
        }),
        PendingSlot::list(first_adc_head, KindId::FrAdcData, |k, list| {
            if let Kind::FrRawData(r) = k {
                r.first_adc = list
            }
        }),
        PendingSlot::list(first_table_head, KindId::FrTable, |k, list| {
            if let Kind::FrRawData(r) = k {
                r.first_table = list
            }
        }),
        PendingSlot::list(first_msg_head, KindId::FrMsg, |k, list| {
            if let Kind::FrRawData(r) = k {
                r.first_msg = list
            }
        }),
        PendingSlot::list(first_misc_head, KindId::FrVect, |k, list| {
            if let Kind::FrRawData(r) = k {
                r.first_misc = list
            }
        }),
    ];
    Ok((kind, slots))
}

pub fn write_raw_data(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let r = k.as_raw_data().ok_or_else(|| Error::InvalidFrameStructure("expected FrRawData".into()))?;
    w.write_string16(order, &r.name)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &r.first_ser))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &r.first_adc))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &r.first_table))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &r.first_msg))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &r.first_misc))
}

pub fn size_raw_data(k: &Kind) -> u64 {
    let r = k.as_raw_data().expect("size_of called on mismatched kind");
    string_size16(&r.name) + 5 * 6
}

// ----------------------------------------------------------------- FrAdcData

/// Current (v8) shape: read directly, no promotion needed.
pub fn read_adc_data_v8(
    r: &mut dyn PrimRead,
    order: ByteOrder,
    _version: Version,
) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let channel_group = r.read_u32(order)?;
    let channel_number = r.read_u32(order)?;
    let n_bits = r.read_u32(order)?;
    let bias = r.read_f32(order)?;
    let slope = r.read_f32(order)?;
    let units = r.read_string16(order)?;
    let sample_rate = r.read_f64(order)?;
    let time_offset = r.read_f64(order)?;
    let f_shift = r.read_f64(order)?;
    let phase = r.read_f32(order)?;
    let data_valid = r.read_u32(order)?;

    let data_head = read_wire_ref(r, order)?;
    let aux_head = read_wire_ref(r, order)?;

    let kind = Kind::FrAdcData(FrAdcData {
        name,
        comment,
        channel_group,
        channel_number,
        n_bits,
        bias,
        slope,
        units,
        sample_rate,
        time_offset,
        f_shift,
        phase,
        data_valid,
        data: Vec::new(),
        aux: Vec::new(),
    });
    let slots = vec![
        PendingSlot::list(data_head, KindId::FrVect, |k, list| {
            if let Kind::FrAdcData(a) = k {
                a.data = list
            }
        }),
        PendingSlot::list(aux_head, KindId::FrVect, |k, list| {
            if let Kind::FrAdcData(a) = k {
                a.aux = list
            }
        }),
    ];
    Ok((kind, slots))
}

/// Legacy (v3/v4/v6) shape: read the wire's own field layout, then promote
/// to the current in-memory shape (`crate::version`) before handing back a
/// `Kind::FrAdcData`.
pub fn read_adc_data_legacy(
    r: &mut dyn PrimRead,
    order: ByteOrder,
    version: Version,
) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let crate_num = r.read_u16(order)?;
    let channel = r.read_u16(order)?;
    let n_bits = r.read_u32(order)?;
    let bias = r.read_f32(order)?;
    let slope = r.read_f32(order)?;
    let units = r.read_string16(order)?;
    let sample_rate = r.read_f64(order)?;
    let time_offset_s = r.read_u32(order)?;
    let time_offset_n = r.read_u32(order)?;
    let f_shift = r.read_f64(order)?;
    let over_range = r.read_u32(order)?;

    let data_head = read_wire_ref(r, order)?;
    let aux_head = read_wire_ref(r, order)?;

    let legacy = FrAdcDataLegacy {
        name,
        comment,
        crate_num,
        channel,
        n_bits,
        bias,
        slope,
        units,
        sample_rate,
        time_offset_s,
        time_offset_n,
        f_shift,
        over_range,
        data: Vec::new(),
        aux: Vec::new(),
    };
    let promoted = crate::version::promote_adc_data(legacy, version);
    let kind = Kind::FrAdcData(promoted);
    let slots = vec![
        PendingSlot::list(data_head, KindId::FrVect, |k, list| {
            if let Kind::FrAdcData(a) = k {
                a.data = list
            }
        }),
        PendingSlot::list(aux_head, KindId::FrVect, |k, list| {
            if let Kind::FrAdcData(a) = k {
                a.aux = list
            }
        }),
    ];
    Ok((kind, slots))
}

pub fn write_adc_data(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let a = k.as_adc_data().ok_or_else(|| Error::InvalidFrameStructure("expected FrAdcData".into()))?;
    w.write_string16(order, &a.name)?;
    w.write_string16(order, &a.comment)?;
    w.write_u32(order, a.channel_group)?;
    w.write_u32(order, a.channel_number)?;
    w.write_u32(order, a.n_bits)?;
    w.write_f32(order, a.bias)?;
    w.write_f32(order, a.slope)?;
    w.write_string16(order, &a.units)?;
    w.write_f64(order, a.sample_rate)?;
    w.write_f64(order, a.time_offset)?;
    w.write_f64(order, a.f_shift)?;
    w.write_f32(order, a.phase)?;
    w.write_u32(order, a.data_valid)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &a.data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &a.aux))
}

/// Demote and write in one step: used when the caller asked
/// [`crate::stream::output::FrameWriter`] for an older target version.
pub fn write_adc_data_legacy(
    k: &Kind,
    w: &mut dyn PrimWrite,
    order: ByteOrder,
    dict: &Dictionary,
    version: Version,
) -> Result<()> {
    let a = k.as_adc_data().ok_or_else(|| Error::InvalidFrameStructure("expected FrAdcData".into()))?;
    let legacy = crate::version::demote_adc_data(a, version)?;
    w.write_string16(order, &legacy.name)?;
    w.write_string16(order, &legacy.comment)?;
    w.write_u16(order, legacy.crate_num)?;
    w.write_u16(order, legacy.channel)?;
    w.write_u32(order, legacy.n_bits)?;
    w.write_f32(order, legacy.bias)?;
    w.write_f32(order, legacy.slope)?;
    w.write_string16(order, &legacy.units)?;
    w.write_f64(order, legacy.sample_rate)?;
    w.write_u32(order, legacy.time_offset_s)?;
    w.write_u32(order, legacy.time_offset_n)?;
    w.write_f64(order, legacy.f_shift)?;
    w.write_u32(order, legacy.over_range)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &a.data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &a.aux))
}

pub fn size_adc_data(k: &Kind) -> u64 {
    let a = k.as_adc_data().expect("size_of called on mismatched kind");
    string_size16(&a.name) + string_size16(&a.comment) + 4 + 4 + 4 + 4 + 4 + string_size16(&a.units) + 8 + 8 + 8 + 4 + 4 + 12
}

// ------------------------------------------------------------------ FrVect

pub fn read_vect(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let type_code = r.read_u16(order)?;
    let data_type = data_type_from_code(type_code)?;
    let n_bytes = r.read_u64(order)?;
    let ndim = r.read_u32(order)?;
    let mut dimensions = Vec::with_capacity(ndim as usize);
    for _ in 0..ndim {
        dimensions.push(Dimension {
            nx: r.read_u64(order)?,
            dx: r.read_f64(order)?,
            start_x: r.read_f64(order)?,
        });
    }
    let unit_y = r.read_string16(order)?;
    let compressed = r.read_u16(order)? != 0;
    let scheme = r.read_u16(order)?;
    let mut raw = vec![0u8; n_bytes as usize];
    r.read_exact_tracked(&mut raw)?;
    let payload = if compressed { Payload::Compressed { scheme, raw } } else { Payload::Expanded(raw) };

    Ok((Kind::FrVect(FrVect { name, data_type, n_bytes, dimensions, unit_y, payload }), Vec::new()))
}

pub fn write_vect(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let v = match k {
        Kind::FrVect(v) => v,
        _ => return Err(Error::InvalidFrameStructure("expected FrVect".into())),
    };
    w.write_string16(order, &v.name)?;
    w.write_u16(order, data_type_to_code(v.data_type))?;
    w.write_u64(order, v.n_bytes)?;
    w.write_u32(order, v.dimensions.len() as u32)?;
    for d in &v.dimensions {
        w.write_u64(order, d.nx)?;
        w.write_f64(order, d.dx)?;
        w.write_f64(order, d.start_x)?;
    }
    w.write_string16(order, &v.unit_y)?;
    match &v.payload {
        Payload::Compressed { scheme, raw } => {
            w.write_u16(order, 1)?;
            w.write_u16(order, *scheme)?;
            w.write_tracked(raw)
        }
        Payload::Expanded(raw) => {
            w.write_u16(order, 0)?;
            w.write_u16(order, 0)?;
            w.write_tracked(raw)
        }
    }
}

pub fn size_vect(k: &Kind) -> u64 {
    let v = match k {
        Kind::FrVect(v) => v,
        _ => return 0,
    };
    let payload_len = match &v.payload {
        Payload::Compressed { raw, .. } | Payload::Expanded(raw) => raw.len() as u64,
    };
    string_size16(&v.name) + 2 + 8 + 4 + (v.dimensions.len() as u64) * 24 + string_size16(&v.unit_y) + 2 + 2 + payload_len
}

fn data_type_from_code(code: u16) -> Result<DataType> {
    Ok(match code {
        0 => DataType::Int8,
        1 => DataType::Int16,
        2 => DataType::Int32,
        3 => DataType::Int64,
        4 => DataType::Float32,
        5 => DataType::Float64,
        6 => DataType::Complex64,
        7 => DataType::Complex128,
        8 => DataType::Uint8,
        9 => DataType::Uint16,
        10 => DataType::Uint32,
        11 => DataType::Uint64,
        other => return Err(Error::DataInvalid(format!("unknown FrVect type code {other}"))),
    })
}

fn data_type_to_code(t: DataType) -> u16 {
    match t {
        DataType::Int8 => 0,
        DataType::Int16 => 1,
        DataType::Int32 => 2,
        DataType::Int64 => 3,
        DataType::Float32 => 4,
        DataType::Float64 => 5,
        DataType::Complex64 => 6,
        DataType::Complex128 => 7,
        DataType::Uint8 => 8,
        DataType::Uint16 => 9,
        DataType::Uint32 => 10,
        DataType::Uint64 => 11,
    }
}

// --------------------------------------------------------------- FrDetector

pub fn read_detector(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let prefix = r.read_string16(order)?;
    let longitude = r.read_f64(order)?;
    let latitude = r.read_f64(order)?;
    let elevation = r.read_f32(order)?;
    let arm_x_azimuth = r.read_f32(order)?;
    let arm_y_azimuth = r.read_f32(order)?;
    let aux_data_head = read_wire_ref(r, order)?;
    let aux_table_head = read_wire_ref(r, order)?;

    let kind = Kind::FrDetector(FrDetector {
        name,
        prefix,
        longitude,
        latitude,
        elevation,
        arm_x_azimuth,
        arm_y_azimuth,
        ..Default::default()
    });
    let slots = vec![
        PendingSlot::list(aux_data_head, KindId::FrVect, |k, list| {
            if let Kind::FrDetector(d) = k {
                d.aux_data = list
            }
        }),
        PendingSlot::list(aux_table_head, KindId::FrTable, |k, list| {
            if let Kind::FrDetector(d) = k {
                d.aux_table = list
            }
        }),
    ];
    Ok((kind, slots))
}

pub fn write_detector(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let d = match k {
        Kind::FrDetector(d) => d,
        _ => return Err(Error::InvalidFrameStructure("expected FrDetector".into())),
    };
    w.write_string16(order, &d.name)?;
    w.write_string16(order, &d.prefix)?;
    w.write_f64(order, d.longitude)?;
    w.write_f64(order, d.latitude)?;
    w.write_f32(order, d.elevation)?;
    w.write_f32(order, d.arm_x_azimuth)?;
    w.write_f32(order, d.arm_y_azimuth)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &d.aux_data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &d.aux_table))
}

pub fn size_detector(k: &Kind) -> u64 {
    let d = match k {
        Kind::FrDetector(d) => d,
        _ => return 0,
    };
    string_size16(&d.name) + string_size16(&d.prefix) + 8 + 8 + 4 + 4 + 4 + 12
}

// ---------------------------------------------------------------- FrProcData

pub fn read_proc_data(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let sample_rate = r.read_f64(order)?;
    let time_offset = GpsTime { seconds: r.read_u32(order)?, nanoseconds: r.read_u32(order)? };
    let f_shift = r.read_f64(order)?;
    let data_head = read_wire_ref(r, order)?;
    let aux_table_ref = read_wire_ref(r, order)?;
    let aux_head = read_wire_ref(r, order)?;

    let kind = Kind::FrProcData(FrProcData { name, comment, sample_rate, time_offset, f_shift, ..Default::default() });
    let mut slots = vec![PendingSlot::list(data_head, KindId::FrVect, |k, list| {
        if let Kind::FrProcData(p) = k {
            p.data = list
        }
    })];
    if let Some(s) = PendingSlot::single(aux_table_ref, KindId::FrTable, |k, idx| {
        if let Kind::FrProcData(p) = k {
            p.aux_table = Some(idx)
        }
    }) {
        slots.push(s);
    }
    slots.push(PendingSlot::list(aux_head, KindId::FrVect, |k, list| {
        if let Kind::FrProcData(p) = k {
            p.aux = list
        }
    }));
    Ok((kind, slots))
}

pub fn write_proc_data(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let p = k.as_proc_data().ok_or_else(|| Error::InvalidFrameStructure("expected FrProcData".into()))?;
    w.write_string16(order, &p.name)?;
    w.write_string16(order, &p.comment)?;
    w.write_f64(order, p.sample_rate)?;
    w.write_u32(order, p.time_offset.seconds)?;
    w.write_u32(order, p.time_offset.nanoseconds)?;
    w.write_f64(order, p.f_shift)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &p.data))?;
    write_wire_ref(w, order, wire_ref_of(dict, p.aux_table))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &p.aux))
}

pub fn size_proc_data(k: &Kind) -> u64 {
    let p = k.as_proc_data().expect("size_of called on mismatched kind");
    string_size16(&p.name) + string_size16(&p.comment) + 8 + 4 + 4 + 8 + 18
}

// ----------------------------------------------------------------- FrHistory

pub fn read_history(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let time = r.read_u32(order)?;
    let comment = r.read_string16(order)?;
    Ok((Kind::FrHistory(FrHistory { name, time, comment }), Vec::new()))
}

pub fn write_history(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let h = match k {
        Kind::FrHistory(h) => h,
        _ => return Err(Error::InvalidFrameStructure("expected FrHistory".into())),
    };
    w.write_string16(order, &h.name)?;
    w.write_u32(order, h.time)?;
    w.write_string16(order, &h.comment)
}

pub fn size_history(k: &Kind) -> u64 {
    match k {
        Kind::FrHistory(h) => string_size16(&h.name) + 4 + string_size16(&h.comment),
        _ => 0,
    }
}

// -------------------------------------------------------- FrEvent/FrSimEvent

pub fn read_event(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let inputs = r.read_string16(order)?;
    let gtime = GpsTime { seconds: r.read_u32(order)?, nanoseconds: r.read_u32(order)? };
    let time_before = r.read_f32(order)?;
    let time_after = r.read_f32(order)?;
    let amplitude = r.read_f64(order)?;
    let probability = r.read_f32(order)?;
    let statistics = r.read_string16(order)?;
    let nparam = r.read_u32(order)?;
    let mut param = Vec::with_capacity(nparam as usize);
    for _ in 0..nparam {
        param.push((r.read_string16(order)?, r.read_f64(order)?));
    }
    let data_head = read_wire_ref(r, order)?;

    let kind = Kind::FrEvent(FrEvent {
        name,
        comment,
        inputs,
        gtime,
        time_before,
        time_after,
        amplitude,
        probability,
        statistics,
        param,
        data: Vec::new(),
    });
    let slots = vec![PendingSlot::list(data_head, KindId::FrVect, |k, list| {
        if let Kind::FrEvent(e) = k {
            e.data = list
        }
    })];
    Ok((kind, slots))
}

pub fn write_event(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let e = match k {
        Kind::FrEvent(e) => e,
        _ => return Err(Error::InvalidFrameStructure("expected FrEvent".into())),
    };
    w.write_string16(order, &e.name)?;
    w.write_string16(order, &e.comment)?;
    w.write_string16(order, &e.inputs)?;
    w.write_u32(order, e.gtime.seconds)?;
    w.write_u32(order, e.gtime.nanoseconds)?;
    w.write_f32(order, e.time_before)?;
    w.write_f32(order, e.time_after)?;
    w.write_f64(order, e.amplitude)?;
    w.write_f32(order, e.probability)?;
    w.write_string16(order, &e.statistics)?;
    w.write_u32(order, e.param.len() as u32)?;
    for (k, v) in &e.param {
        w.write_string16(order, k)?;
        w.write_f64(order, *v)?;
    }
    write_wire_ref(w, order, wire_ref_list_head(dict, &e.data))
}

pub fn size_event(k: &Kind) -> u64 {
    let e = match k {
        Kind::FrEvent(e) => e,
        _ => return 0,
    };
    string_size16(&e.name)
        + string_size16(&e.comment)
        + string_size16(&e.inputs)
        + 4 + 4 + 4 + 4 + 8 + 4
        + string_size16(&e.statistics)
        + 4
        + e.param.iter().map(|(k, _)| string_size16(k) + 8).sum::<u64>()
        + 6
}

pub fn read_sim_event(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let inputs = r.read_string16(order)?;
    let gtime = GpsTime { seconds: r.read_u32(order)?, nanoseconds: r.read_u32(order)? };
    let time_before = r.read_f32(order)?;
    let time_after = r.read_f32(order)?;
    let amplitude = r.read_f64(order)?;
    let nparam = r.read_u32(order)?;
    let mut param = Vec::with_capacity(nparam as usize);
    for _ in 0..nparam {
        param.push((r.read_string16(order)?, r.read_f64(order)?));
    }
    let data_head = read_wire_ref(r, order)?;

    let kind = Kind::FrSimEvent(FrSimEvent {
        name,
        comment,
        inputs,
        gtime,
        time_before,
        time_after,
        amplitude,
        param,
        data: Vec::new(),
    });
    let slots = vec![PendingSlot::list(data_head, KindId::FrVect, |k, list| {
        if let Kind::FrSimEvent(e) = k {
            e.data = list
        }
    })];
    Ok((kind, slots))
}

pub fn write_sim_event(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let e = match k {
        Kind::FrSimEvent(e) => e,
        _ => return Err(Error::InvalidFrameStructure("expected FrSimEvent".into())),
    };
    w.write_string16(order, &e.name)?;
    w.write_string16(order, &e.comment)?;
    w.write_string16(order, &e.inputs)?;
    w.write_u32(order, e.gtime.seconds)?;
    w.write_u32(order, e.gtime.nanoseconds)?;
    w.write_f32(order, e.time_before)?;
    w.write_f32(order, e.time_after)?;
    w.write_f64(order, e.amplitude)?;
    w.write_u32(order, e.param.len() as u32)?;
    for (k, v) in &e.param {
        w.write_string16(order, k)?;
        w.write_f64(order, *v)?;
    }
    write_wire_ref(w, order, wire_ref_list_head(dict, &e.data))
}

pub fn size_sim_event(k: &Kind) -> u64 {
    let e = match k {
        Kind::FrSimEvent(e) => e,
        _ => return 0,
    };
    string_size16(&e.name)
        + string_size16(&e.comment)
        + string_size16(&e.inputs)
        + 4 + 4 + 4 + 4 + 8 + 4
        + e.param.iter().map(|(k, _)| string_size16(k) + 8).sum::<u64>()
        + 6
}

// ----------------------------------------------------------------- FrSimData

pub fn read_sim_data(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let sample_rate = r.read_f64(order)?;
    let time_offset = r.read_f64(order)?;
    let f_shift = r.read_f64(order)?;
    let phase = r.read_f32(order)?;
    let data_head = read_wire_ref(r, order)?;
    let input_head = read_wire_ref(r, order)?;

    let kind =
        Kind::FrSimData(FrSimData { name, comment, sample_rate, time_offset, f_shift, phase, data: Vec::new(), input: Vec::new() });
    let slots = vec![
        PendingSlot::list(data_head, KindId::FrVect, |k, list| {
            if let Kind::FrSimData(s) = k {
                s.data = list
            }
        }),
        PendingSlot::list(input_head, KindId::FrVect, |k, list| {
            if let Kind::FrSimData(s) = k {
                s.input = list
            }
        }),
    ];
    Ok((kind, slots))
}

pub fn write_sim_data(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let s = match k {
        Kind::FrSimData(s) => s,
        _ => return Err(Error::InvalidFrameStructure("expected FrSimData".into())),
    };
    w.write_string16(order, &s.name)?;
    w.write_string16(order, &s.comment)?;
    w.write_f64(order, s.sample_rate)?;
    w.write_f64(order, s.time_offset)?;
    w.write_f64(order, s.f_shift)?;
    w.write_f32(order, s.phase)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &s.data))?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &s.input))
}

pub fn size_sim_data(k: &Kind) -> u64 {
    match k {
        Kind::FrSimData(s) => string_size16(&s.name) + string_size16(&s.comment) + 8 + 8 + 8 + 4 + 12,
        _ => 0,
    }
}

// -------------------------------------------------------------- FrSummaryData

pub fn read_summary(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let test = r.read_string16(order)?;
    let moments_head = read_wire_ref(r, order)?;

    let kind = Kind::FrSummary(FrSummaryData { name, comment, test, moments: Vec::new() });
    let slots = vec![PendingSlot::list(moments_head, KindId::FrVect, |k, list| {
        if let Kind::FrSummary(s) = k {
            s.moments = list
        }
    })];
    Ok((kind, slots))
}

pub fn write_summary(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, dict: &Dictionary) -> Result<()> {
    let s = match k {
        Kind::FrSummary(s) => s,
        _ => return Err(Error::InvalidFrameStructure("expected FrSummaryData".into())),
    };
    w.write_string16(order, &s.name)?;
    w.write_string16(order, &s.comment)?;
    w.write_string16(order, &s.test)?;
    write_wire_ref(w, order, wire_ref_list_head(dict, &s.moments))
}

pub fn size_summary(k: &Kind) -> u64 {
    match k {
        Kind::FrSummary(s) => string_size16(&s.name) + string_size16(&s.comment) + string_size16(&s.test) + 6,
        _ => 0,
    }
}

// ------------------------------------------------------------------ FrTable

pub fn read_table(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let name = r.read_string16(order)?;
    let comment = r.read_string16(order)?;
    let ncol = r.read_u32(order)?;
    let mut columns = Vec::with_capacity(ncol as usize);
    for _ in 0..ncol {
        columns.push(r.read_string16(order)?);
    }
    let nrow = r.read_u32(order)?;
    let mut rows = Vec::with_capacity(nrow as usize);
    for _ in 0..nrow {
        let mut row = Vec::with_capacity(ncol as usize);
        for _ in 0..ncol {
            row.push(r.read_string16(order)?);
        }
        rows.push(row);
    }
    Ok((Kind::FrTable(FrTable { name, comment, columns, rows }), Vec::new()))
}

pub fn write_table(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let t = match k {
        Kind::FrTable(t) => t,
        _ => return Err(Error::InvalidFrameStructure("expected FrTable".into())),
    };
    w.write_string16(order, &t.name)?;
    w.write_string16(order, &t.comment)?;
    w.write_u32(order, t.columns.len() as u32)?;
    for c in &t.columns {
        w.write_string16(order, c)?;
    }
    w.write_u32(order, t.rows.len() as u32)?;
    for row in &t.rows {
        for cell in row {
            w.write_string16(order, cell)?;
        }
    }
    Ok(())
}

pub fn size_table(k: &Kind) -> u64 {
    let t = match k {
        Kind::FrTable(t) => t,
        _ => return 0,
    };
    string_size16(&t.name)
        + string_size16(&t.comment)
        + 4
        + t.columns.iter().map(|c| string_size16(c)).sum::<u64>()
        + 4
        + t.rows.iter().flatten().map(|c| string_size16(c)).sum::<u64>()
}

// -------------------------------------------------------------------- FrMsg

pub fn read_msg(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let message = r.read_string16(order)?;
    let severity = r.read_i32(order)?;
    let alarm = r.read_u32(order)?;
    Ok((Kind::FrMsg(FrMsg { message, severity, alarm }), Vec::new()))
}

pub fn write_msg(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let m = match k {
        Kind::FrMsg(m) => m,
        _ => return Err(Error::InvalidFrameStructure("expected FrMsg".into())),
    };
    w.write_string16(order, &m.message)?;
    w.write_i32(order, m.severity)?;
    w.write_u32(order, m.alarm)
}

pub fn size_msg(k: &Kind) -> u64 {
    match k {
        Kind::FrMsg(m) => string_size16(&m.message) + 4 + 4,
        _ => 0,
    }
}

// ------------------------------------------------------------------- FrEndOfFile

pub fn read_eof(r: &mut dyn PrimRead, order: ByteOrder, _version: Version) -> Result<(Kind, Vec<PendingSlot>)> {
    let nframe = r.read_u32(order)?;
    let toc_offset = r.read_u64(order)?;
    let chk_type_code = r.read_u16(order)?;
    let chk_type = match ChecksumKind::from_wire(chk_type_code) {
        ChecksumKind::None => None,
        other => Some(other),
    };
    let nbytes = r.read_u64(order)?;
    let chk_sum = r.read_u32(order)?;
    Ok((Kind::FrEndOfFile(FrEndOfFile { nframe, toc_offset, chk_type, nbytes, chk_sum }), Vec::new()))
}

pub fn write_eof(k: &Kind, w: &mut dyn PrimWrite, order: ByteOrder, _dict: &Dictionary) -> Result<()> {
    let e = match k {
        Kind::FrEndOfFile(e) => e,
        _ => return Err(Error::InvalidFrameStructure("expected FrEndOfFile".into())),
    };
    w.write_u32(order, e.nframe)?;
    w.write_u64(order, e.toc_offset)?;
    w.write_u16(order, e.chk_type.map(|c| c.to_wire()).unwrap_or(0))?;
    w.write_u64(order, e.nbytes)?;
    w.write_u32(order, e.chk_sum)
}

pub fn size_eof(_k: &Kind) -> u64 {
    4 + 8 + 2 + 8 + 4
}

fn string_size16(s: &str) -> u64 {
    2 + if s.is_empty() { 0 } else { s.len() as u64 + 1 }
}
