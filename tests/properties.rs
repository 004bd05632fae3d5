//! Property-based round-trip checks (spec.md §8, P1 and P7), backed by
//! `proptest` per DESIGN.md's ambient-stack note.

use gwframe::buffer::MemoryBuffer;
use gwframe::config::StreamConfig;
use gwframe::model::{FrAdcData, FrameH, GpsTime};
use gwframe::Kind;
use gwframe::{FrameReader, FrameWriter};
use proptest::prelude::*;

fn frame_name() -> impl Strategy<Value = String> {
    "[A-Z][A-Z0-9-]{1,16}"
}

proptest! {
    /// P1: every scalar field of a childless `FrameH` survives a write/read
    /// cycle unchanged.
    #[test]
    fn frame_h_scalars_round_trip(
        name in frame_name(),
        run in any::<i32>(),
        frame in any::<u32>(),
        seconds in any::<u32>(),
        nanoseconds in 0u32..1_000_000_000,
        dt in 0.001f64..10_000.0,
        uleaps in 10i32..40,
    ) {
        let original = FrameH {
            name: name.clone(),
            run,
            frame,
            data_quality: 0,
            gtime: GpsTime { seconds, nanoseconds },
            uleaps,
            dt,
            ..Default::default()
        };

        let mut writer = FrameWriter::open_write(MemoryBuffer::new(), StreamConfig::default()).unwrap();
        let idx = writer.push(Kind::FrameH(original.clone()));
        writer.write_frame(idx).unwrap();
        let buf = writer.close().unwrap();

        let mut reader = FrameReader::open_read(buf).unwrap();
        let read_idx = reader.read_frame().unwrap().unwrap();
        reader.finish().unwrap();
        let round_tripped = reader.arena().get(read_idx).as_frame_h().unwrap();

        prop_assert_eq!(&round_tripped.name, &original.name);
        prop_assert_eq!(round_tripped.run, original.run);
        prop_assert_eq!(round_tripped.frame, original.frame);
        prop_assert_eq!(round_tripped.gtime.seconds, original.gtime.seconds);
        prop_assert_eq!(round_tripped.gtime.nanoseconds, original.gtime.nanoseconds);
        prop_assert_eq!(round_tripped.uleaps, original.uleaps);
        prop_assert!((round_tripped.dt - original.dt).abs() < 1e-9);
    }

    /// P7: within one written file, instance ids assigned to same-kind
    /// objects are `0, 1, 2, ...` with no gaps, which the dictionary
    /// recovers on read as the `FrAdcData` siblings' declared order.
    #[test]
    fn adc_instance_ids_are_gapless_on_write(count in 1usize..12) {
        let mut writer = FrameWriter::open_write(MemoryBuffer::new(), StreamConfig::default()).unwrap();
        let channels: Vec<_> = (0..count)
            .map(|i| writer.push(Kind::FrAdcData(FrAdcData { name: format!("H1:CH{i}"), ..Default::default() })))
            .collect();
        let raw = writer.push(Kind::FrRawData(gwframe::model::FrRawData {
            name: "raw".into(),
            first_adc: channels,
            ..Default::default()
        }));
        let frame = writer.push(Kind::FrameH(FrameH { name: "H-R-0-1".into(), raw_data: Some(raw), ..Default::default() }));
        writer.write_frame(frame).unwrap();
        let buf = writer.close().unwrap();

        let mut reader = FrameReader::open_read(buf).unwrap();
        let frame_idx = reader.read_frame().unwrap().unwrap();
        reader.finish().unwrap();
        let frame = reader.arena().get(frame_idx).as_frame_h().unwrap();
        let raw = reader.arena().get(frame.raw_data.unwrap()).as_raw_data().unwrap();
        prop_assert_eq!(raw.first_adc.len(), count);
        for (i, &idx) in raw.first_adc.iter().enumerate() {
            let a = reader.arena().get(idx).as_adc_data().unwrap();
            prop_assert_eq!(&a.name, &format!("H1:CH{i}"));
        }
    }
}
