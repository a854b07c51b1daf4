// Property tests for aspect-ratio fitting and border compositing
use std::io::Cursor;

use aspect_border::compositor::{
    AspectRatio, Color, Compositor, ProcessingRequest, ProcessingResult, plan_canvas,
};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use proptest::prelude::*;

fn patterned(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 7 % 256) as u8,
            (y * 13 % 256) as u8,
            ((x + y) % 256) as u8,
            (128 + (x * y) % 128) as u8,
        ])
    })
}

fn png_bytes(image: RgbaImage) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("encode test image");
    cursor.into_inner()
}

fn decode(result: &ProcessingResult) -> RgbaImage {
    image::load_from_memory(&result.raster)
        .expect("decode result")
        .to_rgba8()
}

fn rounded(value: f64) -> u32 {
    value.round() as u32
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn matching_ratio_only_adds_border(w in 1u32..400, h in 1u32..400, t in 0u32..50) {
        let plan = plan_canvas(w, h, AspectRatio::new(w as f64, h as f64), t).expect("plan");

        prop_assert_eq!((plan.canvas_width, plan.canvas_height), (w + 2 * t, h + 2 * t));
        prop_assert_eq!((plan.offset_x, plan.offset_y), (t, t));
    }

    #[test]
    fn unset_ratio_ignores_image_shape(
        w in 1u32..400,
        h in 1u32..400,
        t in 0u32..50,
        only_one in 0.0f64..50.0,
    ) {
        for ratio in [
            AspectRatio::unset(),
            AspectRatio::new(only_one, 0.0),
            AspectRatio::new(0.0, only_one),
        ] {
            let plan = plan_canvas(w, h, ratio, t).expect("plan");
            prop_assert_eq!((plan.canvas_width, plan.canvas_height), (w + 2 * t, h + 2 * t));
            prop_assert_eq!((plan.offset_x, plan.offset_y), (t, t));
        }
    }

    #[test]
    fn wider_target_pads_left_and_right(
        w in 1u32..2000,
        h in 1u32..2000,
        rw in 1u32..200,
        rh in 1u32..200,
        t in 0u32..20,
    ) {
        let target = rw as f64 / rh as f64;
        prop_assume!((w as f64 / h as f64) < target);
        let expected_width = rounded(h as f64 * target);

        let plan = plan_canvas(w, h, AspectRatio::new(rw as f64, rh as f64), t).expect("plan");

        prop_assert_eq!(plan.canvas_height, h + 2 * t);
        prop_assert_eq!(plan.offset_y, t);
        if h >= 2 && rounded(w as f64 / target) == h {
            // 原图本身就是一次补上下后的输出
            prop_assert_eq!(plan.canvas_width, w + 2 * t);
        } else {
            prop_assert_eq!(plan.canvas_width, expected_width.max(w) + 2 * t);
        }
        let left = plan.offset_x - t;
        let right = plan.bounding_width - w - left;
        prop_assert!(right == left || right == left + 1);
    }

    #[test]
    fn taller_target_pads_top_and_bottom(
        w in 1u32..2000,
        h in 1u32..2000,
        rw in 1u32..200,
        rh in 1u32..200,
        t in 0u32..20,
    ) {
        let target = rw as f64 / rh as f64;
        prop_assume!((w as f64 / h as f64) > target);
        let expected_height = rounded(w as f64 / target);

        let plan = plan_canvas(w, h, AspectRatio::new(rw as f64, rh as f64), t).expect("plan");

        prop_assert_eq!(plan.canvas_width, w + 2 * t);
        prop_assert_eq!(plan.offset_x, t);
        if w >= 2 && rounded(h as f64 * target) == w {
            // 原图本身就是一次补左右后的输出
            prop_assert_eq!(plan.canvas_height, h + 2 * t);
        } else {
            prop_assert_eq!(plan.canvas_height, expected_height + 2 * t);
        }
        let top = plan.offset_y - t;
        let bottom = plan.bounding_height - h - top;
        prop_assert!(bottom == top || bottom == top + 1);
    }

    #[test]
    fn replanning_a_padded_box_changes_nothing(
        w in 1u32..5000,
        h in 1u32..5000,
        rw in 0.01f64..500.0,
        rh in 0.01f64..500.0,
    ) {
        let ratio = AspectRatio::new(rw, rh);
        let first = plan_canvas(w, h, ratio, 0).expect("first plan");

        let second = plan_canvas(first.canvas_width, first.canvas_height, ratio, 0)
            .expect("second plan");

        prop_assert_eq!(
            (second.canvas_width, second.canvas_height),
            (first.canvas_width, first.canvas_height)
        );
        prop_assert_eq!((second.offset_x, second.offset_y), (0, 0));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn recompositing_padded_output_is_noop(
        w in 1u32..96,
        h in 1u32..96,
        rw in 1u32..40,
        rh in 1u32..40,
        (r, g, b) in any::<(u8, u8, u8)>(),
    ) {
        let compositor = Compositor::default();
        let ratio = AspectRatio::new(rw as f64, rh as f64);
        let color = Color::rgb(r, g, b);

        let first = compositor
            .process(
                ProcessingRequest::new(png_bytes(patterned(w, h)))
                    .with_aspect_ratio(ratio)
                    .with_border_color(color),
            )
            .expect("first pass");
        let second = compositor
            .process(
                ProcessingRequest::new(first.raster.clone())
                    .with_aspect_ratio(ratio)
                    .with_border_color(color),
            )
            .expect("second pass");

        prop_assert_eq!((second.width, second.height), (first.width, first.height));
        prop_assert!(decode(&first) == decode(&second));
    }
}

#[test]
fn wide_image_to_square_adds_top_and_bottom_padding() {
    let border = Rgba([0, 200, 0, 255]);
    let request = ProcessingRequest::new(png_bytes(patterned(100, 50)))
        .with_aspect_ratio(AspectRatio::new(1.0, 1.0))
        .with_border_thickness(0)
        .with_border_color(Color::rgb(0, 200, 0));

    let result = Compositor::default().process(request).expect("process");
    let output = decode(&result);
    let source = patterned(100, 50);

    assert_eq!(output.dimensions(), (100, 100));
    for x in [0, 50, 99] {
        assert_eq!(output.get_pixel(x, 0), &border);
        assert_eq!(output.get_pixel(x, 24), &border);
        assert_eq!(output.get_pixel(x, 75), &border);
        assert_eq!(output.get_pixel(x, 99), &border);
    }
    assert_eq!(output.get_pixel(0, 25), source.get_pixel(0, 0));
    assert_eq!(output.get_pixel(99, 74), source.get_pixel(99, 49));
}

#[test]
fn unset_ratio_with_border_offsets_image_by_thickness() {
    let request = ProcessingRequest::new(png_bytes(patterned(100, 50)))
        .with_aspect_ratio(AspectRatio::unset())
        .with_border_thickness(10)
        .with_border_color(Color::rgb(255, 255, 255));

    let result = Compositor::default().process(request).expect("process");
    let output = decode(&result);
    let source = patterned(100, 50);

    assert_eq!((result.width, result.height), (120, 70));
    assert_eq!(output.get_pixel(9, 9), &Rgba([255, 255, 255, 255]));
    assert_eq!(output.get_pixel(10, 10), source.get_pixel(0, 0));
    assert_eq!(output.get_pixel(109, 59), source.get_pixel(99, 49));
    assert_eq!(output.get_pixel(110, 60), &Rgba([255, 255, 255, 255]));
}

#[test]
fn translucent_border_keeps_alpha() {
    let request = ProcessingRequest::new(png_bytes(patterned(4, 4)))
        .with_border_thickness(2)
        .with_border_color(Color::rgb(10, 20, 30).with_alpha(0.2));

    let output = decode(&Compositor::default().process(request).expect("process"));

    assert_eq!(output.get_pixel(0, 0), &Rgba([10, 20, 30, 51]));
}
