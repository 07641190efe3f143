use landscape_tools::ngs::merge::{merge_read_pair, reverse_complement, MergeLayout};
use landscape_tools::ngs::{FastqRecord, PairedFastqReader};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

fn random_read(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| b"ACGTN"[rng.gen_range(0..5)]).collect()
}

fn random_qual(rng: &mut StdRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| rng.gen_range(b'!'..=b'J')).collect()
}

#[test]
fn merged_reads_follow_position_rules() {
    let layout = MergeLayout::default();
    let mut rng = StdRng::seed_from_u64(42);

    for case in 0..200 {
        let fwd_len = rng.gen_range(151..171);
        let rev_len = rng.gen_range(151..171);
        let fwd = FastqRecord::new(
            format!("@f{}", case),
            random_read(&mut rng, fwd_len),
            random_qual(&mut rng, fwd_len),
        );
        let rev = FastqRecord::new(
            format!("@r{}", case),
            random_read(&mut rng, rev_len),
            random_qual(&mut rng, rev_len),
        );

        let merged = merge_read_pair(&fwd, &rev, &layout).unwrap().into_bytes();
        assert_eq!(merged.len(), 270);

        let fwd_rc = reverse_complement(&fwd.name, &fwd.seq).unwrap();
        let fwd_q: Vec<u8> = fwd.qual.iter().rev().copied().collect();

        for i in 0..270 {
            let expected = if i < 119 {
                rev.seq[i]
            } else if i >= 151 {
                fwd_rc[i - 119]
            } else if rev.qual[i] < fwd_q[i - 119] {
                fwd_rc[i - 119]
            } else {
                rev.seq[i]
            };
            assert_eq!(merged[i], expected, "case {} position {}", case, i);
        }
    }
}

#[test]
fn poly_a_forward_and_poly_t_reverse() {
    let fwd = FastqRecord::new("@f", vec![b'A'; 151], vec![b'!'; 151]);
    let rev = FastqRecord::new("@r", vec![b'T'; 151], vec![b'I'; 151]);
    let merged = merge_read_pair(&fwd, &rev, &MergeLayout::default()).unwrap();

    assert_eq!(merged.len(), 270);
    assert_eq!(&merged[..151], "T".repeat(151));
    assert_eq!(&merged[151..], "T".repeat(119));
}

#[test]
fn scanning_then_merging_in_memory() {
    let fwd_read = "A".repeat(151);
    let rev_read = "C".repeat(151);
    let qual = "I".repeat(151);
    let r1 = format!("@p1\n{fwd_read}\n+\n{qual}\n@p2\n{fwd_read}\n+\n{qual}\n");
    let r2 = format!("@p1\n{rev_read}\n+\n{qual}\n@p2\n{rev_read}\n+\n{qual}\n");

    let reader = PairedFastqReader::from_bytes(Cursor::new(r1.into_bytes()), Cursor::new(r2.into_bytes()));
    let merged: Vec<String> = reader
        .map(|pair| {
            let (fwd, rev) = pair.unwrap();
            merge_read_pair(&fwd, &rev, &MergeLayout::default()).unwrap()
        })
        .collect();

    assert_eq!(merged.len(), 2);
    let expected = format!("{}{}", "C".repeat(151), "T".repeat(119));
    assert!(merged.iter().all(|m| *m == expected));
}

#[test]
fn truncated_record_fails_with_read_name() {
    let r1 = "@p1\n".to_string();
    let r2 = "@p1\n".to_string();
    let mut reader = PairedFastqReader::from_bytes(Cursor::new(r1.into_bytes()), Cursor::new(r2.into_bytes()));
    let (fwd, rev) = reader.next().unwrap().unwrap();
    let err = merge_read_pair(&fwd, &rev, &MergeLayout::default()).unwrap_err();
    assert!(err.to_string().contains("@p1"));
}
