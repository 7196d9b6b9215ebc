mod common;

use common::fixtures::{counting_roi, ramp_u8};
use image_stack::{ImageStack, Lut, StackError};
use ndarray::{Array2, Array3, array, s};

#[test]
fn operations_without_snapshot_are_no_ops() {
    let mut stack = ImageStack::new(vec![ramp_u8(3, 3, 0)], None).unwrap();
    let before = stack.active_slice().clone();

    assert!(!stack.restore(false));
    assert!(!stack.restore(true));
    assert!(!stack.swap());
    assert!(stack.snapshot().is_none());
    assert_eq!(stack.active_slice(), &before);
}

#[test]
fn snapshot_reuses_its_buffer() {
    let mut stack = ImageStack::new(vec![ramp_u8(3, 3, 0), ramp_u8(3, 3, 100)], None).unwrap();
    stack.capture_snapshot();
    let buffer = stack.snapshot().unwrap().as_ptr();

    stack.set_active(1);
    stack.capture_snapshot();
    assert_eq!(stack.snapshot().unwrap().as_ptr(), buffer);
    assert_eq!(stack.snapshot().unwrap(), stack.active_slice());
}

#[test]
fn snapshot_is_independent_of_later_edits() {
    let mut stack = ImageStack::new(vec![ramp_u8(3, 3, 0)], None).unwrap();
    stack.capture_snapshot();
    stack.active_slice_mut().fill(9);
    assert_eq!(stack.snapshot().unwrap()[[2, 2]], 8);
}

#[test]
fn full_restore_undoes_edits() {
    let mut stack = ImageStack::new(vec![ramp_u8(4, 4, 0)], None).unwrap();
    let original = stack.active_slice().clone();

    stack.capture_snapshot();
    stack.active_slice_mut().mapv_inplace(|v| 255 - v);
    assert_ne!(stack.active_slice(), &original);

    assert!(stack.restore(false));
    assert_eq!(stack.active_slice(), &original);
}

#[test]
fn masked_restore_keeps_roi_edits() {
    let mut stack = ImageStack::new(vec![ramp_u8(5, 5, 0)], None).unwrap();
    let (_roi, shared) = counting_roi(1, 1, 3, 4);
    stack.set_roi(Some(shared));
    let original = stack.active_slice().clone();

    stack.capture_snapshot();
    stack.active_slice_mut().fill(200);
    assert!(stack.restore(true));

    for ((y, x), &value) in stack.active_slice().indexed_iter().map(|(i, v)| ((i[0], i[1]), v)) {
        let inside = (1..4).contains(&y) && (1..3).contains(&x);
        if inside {
            assert_eq!(value, 200, "edit inside ROI lost at ({y}, {x})");
        } else {
            assert_eq!(value, original[[y, x]], "pixel outside ROI not restored at ({y}, {x})");
        }
    }
}

#[test]
fn masked_restore_without_roi_restores_everything() {
    let mut stack = ImageStack::new(vec![ramp_u8(3, 3, 0)], None).unwrap();
    let original = stack.active_slice().clone();
    stack.capture_snapshot();
    stack.active_slice_mut().fill(0);

    assert!(stack.restore(true));
    assert_eq!(stack.active_slice(), &original);
}

#[test]
fn masked_restore_on_rgb_slices() {
    let slice = Array3::<u8>::from_elem((4, 4, 3), 50);
    let mut stack = ImageStack::new(vec![slice], None).unwrap();
    let (_roi, shared) = counting_roi(0, 0, 2, 2);
    stack.set_roi(Some(shared));

    stack.capture_snapshot();
    stack.active_slice_mut().fill(7);
    stack.restore(true);

    let active = stack.active_slice();
    assert!(active.slice(s![0..2, 0..2, ..]).iter().all(|&v| v == 7));
    assert!(active.slice(s![2.., .., ..]).iter().all(|&v| v == 50));
    assert!(active.slice(s![.., 2.., ..]).iter().all(|&v| v == 50));
}

#[test]
fn swap_exchanges_buffers() {
    let mut stack = ImageStack::new(vec![ramp_u8(3, 3, 0)], None).unwrap();
    let original = stack.active_slice().clone();
    let original_ptr = stack.active_slice().as_ptr();

    stack.capture_snapshot();
    let snapshot_ptr = stack.snapshot().unwrap().as_ptr();
    stack.active_slice_mut().fill(1);

    assert!(stack.swap());
    assert_eq!(stack.active_slice().as_ptr(), snapshot_ptr);
    assert_eq!(stack.snapshot().unwrap().as_ptr(), original_ptr);
    assert_eq!(stack.active_slice(), &original);
    assert!(stack.snapshot().unwrap().iter().all(|&v| v == 1));

    assert!(stack.swap());
    assert_eq!(stack.active_slice().as_ptr(), original_ptr);
    assert!(stack.active_slice().iter().all(|&v| v == 1));
}

#[test]
fn swap_on_volume_stack() {
    let volume = ndarray::Array3::<i16>::from_shape_fn((3, 2, 2), |(z, _, _)| z as i16);
    let mut stack = ImageStack::new(volume, None).unwrap();
    stack.set_active(2);
    stack.capture_snapshot();
    stack.active_slice_mut().fill(-1);

    stack.swap();
    assert!(stack.active_slice().iter().all(|&v| v == 2));
    assert!(stack.slice(Some(1)).unwrap().iter().all(|&v| v == 1));
}

#[test]
fn eight_bit_display_is_a_table_lookup() {
    let stack = ImageStack::new(vec![ramp_u8(4, 8, 100)], None).unwrap();
    let display = stack.to_display().unwrap();
    let lut = Lut::grays();

    assert_eq!(display.dim(), (4, 8, 3));
    for ((y, x), &value) in stack.active_slice().indexed_iter().map(|(i, v)| ((i[0], i[1]), v)) {
        assert_eq!(display.slice(s![y, x, ..]).to_vec(), lut.lookup(value).to_vec());
    }
}

#[test]
fn eight_bit_display_ignores_display_range() {
    let mut stack = ImageStack::new(vec![array![[10u8, 240]]], None).unwrap();
    stack.set_display_range(100.0, 120.0).unwrap();
    let display = stack.to_display().unwrap();
    assert_eq!(display[[0, 0, 0]], 10);
    assert_eq!(display[[0, 1, 0]], 240);
}

#[test]
fn sixteen_bit_display_is_clipped() {
    let data = array![[i16::MIN, -51, -50, 0], [100, 199, 200, i16::MAX]];
    let mut stack = ImageStack::new(vec![data], None).unwrap();
    stack.set_display_range(-50.0, 200.0).unwrap();

    let display = stack.to_display().unwrap();
    let red: Array2<u8> = display.slice(s![.., .., 0]).to_owned();
    assert_eq!(red[[0, 0]], 0);
    assert_eq!(red[[0, 1]], 0);
    assert_eq!(red[[0, 2]], 0);
    assert_eq!(red[[0, 3]], 51);
    assert!(red[[1, 2]] >= 254);
    assert_eq!(red[[1, 3]], red[[1, 2]]);
    assert!(red[[1, 0]] < red[[1, 1]]);
}

#[test]
fn float_display_spans_full_range() {
    let data = Array2::<f32>::from_shape_fn((1, 5), |(_, x)| x as f32 * 128.0 - 64.0);
    let mut stack = ImageStack::new(vec![data], None).unwrap();
    stack.set_display_range(0.0, 510.0).unwrap();

    let display = stack.to_display().unwrap();
    let values: Vec<u8> = display.slice(s![0, .., 1]).to_vec();
    assert_eq!(values, vec![0, 32, 96, 160, 224]);
}

#[test]
fn multi_channel_non_eight_bit_display_fails() {
    let stack = ImageStack::new(vec![Array3::<f32>::zeros((2, 2, 3))], None).unwrap();
    assert!(matches!(
        stack.to_display(),
        Err(StackError::UnsupportedDisplay { channels: 3, .. })
    ));
}

#[test]
fn mutable_view_edits_keep_slice_shape() {
    let mut stack = ImageStack::new(vec![ramp_u8(4, 4, 0)], None).unwrap();
    let original = stack.active_slice().clone();
    stack.capture_snapshot();

    let mut view = stack.active_slice_mut();
    view.slice_mut(s![1..3, 1..3]).fill(99);
    assert_eq!(view.shape(), &[4, 4]);

    assert_eq!(stack.dim(), (4, 4));
    assert_eq!(stack.active_slice()[[2, 2]], 99);
    assert!(stack.restore(false));
    assert_eq!(stack.active_slice(), &original);
}
