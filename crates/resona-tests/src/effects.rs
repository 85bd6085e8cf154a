//! Integration tests for the restoration passes.

use resona_core::{LabeledRegion, ResonaError, SampleRate};
use resona_effects::{ClickRemoval, FindClicks, WINDOW_SIZE};

/// Silence with rectangular spikes at the given sample positions.
fn signal_with_spikes(len: usize, spikes: &[usize], spike_len: usize) -> Vec<f32> {
    let mut samples = vec![0.0f32; len];
    for &at in spikes {
        for s in &mut samples[at..at + spike_len] {
            *s = 1.0;
        }
    }
    samples
}

#[test]
fn spike_scenario_detector() {
    // 8192 samples of silence, spike of amplitude 1.0 over [4000, 4010).
    let samples = signal_with_spikes(WINDOW_SIZE, &[4000], 10);
    let labels = FindClicks::new(200, 20)
        .analyze(&samples, SampleRate::CD)
        .unwrap();

    assert_eq!(labels.len(), 1);
    let label = &labels[0];
    assert_eq!(label.label, "Click");
    // Interval covers the spike with at most a probe width of slop.
    assert!(label.start <= 4000.0 / 44_100.0);
    assert!(label.end >= 4010.0 / 44_100.0);
    assert!(label.duration() < 60.0 / 44_100.0);
}

#[test]
fn spike_scenario_remover() {
    let mut samples = signal_with_spikes(WINDOW_SIZE, &[4000], 10);
    let modified = ClickRemoval::new(200, 20).process(&mut samples).unwrap();

    assert!(modified);
    // Repaired samples lie on the line between the silent boundary
    // neighbourhoods, i.e. silence.
    for (i, &s) in samples.iter().enumerate() {
        assert!(s.abs() < 1e-6, "sample {i} = {s} after repair");
    }
}

#[test]
fn remover_is_idempotent_once_repaired() {
    let mut samples = signal_with_spikes(WINDOW_SIZE * 2, &[3000, 9000], 8);
    let removal = ClickRemoval::default();

    assert!(removal.process(&mut samples).unwrap());
    let after_first = samples.clone();

    assert!(!removal.process(&mut samples).unwrap());
    assert_eq!(samples, after_first);
}

#[test]
fn detector_and_remover_agree() {
    let samples = signal_with_spikes(WINDOW_SIZE * 2, &[5000, 12_000], 8);
    let finder = FindClicks::default();

    let before = finder.detect(&samples).unwrap();
    assert!(!before.is_empty());

    let mut repaired = samples.clone();
    assert!(ClickRemoval::default().process(&mut repaired).unwrap());

    // Everything the detector flagged is gone after repair.
    assert!(finder.detect(&repaired).unwrap().is_empty());
}

#[test]
fn clicks_in_separate_windows_are_all_found() {
    // One spike per analysis window, across several windows.
    let spikes = [5000, 17_000, 29_000];
    let samples = signal_with_spikes(WINDOW_SIZE * 5, &spikes, 8);
    let ranges = FindClicks::default().detect(&samples).unwrap();

    assert_eq!(ranges.len(), spikes.len());
    for (range, &spike) in ranges.iter().zip(spikes.iter()) {
        assert!(range.contains(spike), "{range:?} does not cover {spike}");
    }
}

#[test]
fn short_selection_is_rejected_without_mutation() {
    let mut samples = signal_with_spikes(1000, &[500], 10);
    let original = samples.clone();

    let err = ClickRemoval::default().process(&mut samples).unwrap_err();
    assert!(matches!(
        err,
        ResonaError::SelectionTooShort { got: 1000, need } if need == WINDOW_SIZE / 2
    ));
    assert_eq!(samples, original);

    let err = FindClicks::default().detect(&samples).unwrap_err();
    assert!(matches!(err, ResonaError::SelectionTooShort { .. }));
}

#[test]
fn labels_round_trip_through_json() {
    let samples = signal_with_spikes(WINDOW_SIZE, &[4000], 10);
    let labels = FindClicks::default()
        .analyze(&samples, SampleRate::STUDIO)
        .unwrap();

    let json = serde_json::to_string(&labels).unwrap();
    let back: Vec<LabeledRegion> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, labels);
}
