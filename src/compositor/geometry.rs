//! 画布几何计算模块
//!
//! 给定原图尺寸、目标宽高比与边框厚度，计算输出画布大小与原图摆放位置。
//!
//! # 设计思路
//!
//! - 算法纯函数化：输入为尺寸与参数，输出唯一的 `CanvasPlan`，便于测试。
//! - 先算“比例外接框”，再加边框，两步互不干扰。
//! - 原图不缩放、不裁剪，只在外侧补边。
//!
//! # 取整规则
//!
//! 需要补边的一轴按 `f64::round` 取整，且不小于原图边长。
//! 取整向上时，输出的比例会略微越过目标比例，再次合成会落到另一轴。
//! 因此当原图另一轴正好等于按比例换算的取整值时（即它本身就是一次补边输出），
//! 视为已符合比例。这样对一次输出再做同比例、零边框的合成时结果不变。

use super::{AspectRatio, ImageError};

/// 合成布局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasPlan {
    /// 输出画布宽度（外接框 + 两侧边框）。
    pub canvas_width: u32,
    /// 输出画布高度。
    pub canvas_height: u32,
    /// 比例外接框宽度（不含边框）。
    pub bounding_width: u32,
    /// 比例外接框高度。
    pub bounding_height: u32,
    /// 原图左上角 X。
    pub offset_x: u32,
    /// 原图左上角 Y。
    pub offset_y: u32,
}

impl CanvasPlan {
    /// 画布总像素数（用于资源上限检查）。
    pub fn canvas_pixels(&self) -> u64 {
        self.canvas_width as u64 * self.canvas_height as u64
    }
}

/// 计算合成布局。
///
/// # 实现步骤
/// 1. `imageRatio = W / H`；比例有效时 `targetRatio = tw / th`，否则等于 `imageRatio`
/// 2. 原图相对更宽：外接框宽 = `W`，高 = `W / targetRatio`；否则高 = `H`，宽 = `H * targetRatio`
/// 3. 画布 = 外接框 + 每轴 `2 * thickness`
/// 4. 原图在外接框内居中，再整体偏移 `thickness`；奇数余量落在右侧/下侧
///
/// # 错误
/// - 原图任一边为 0：`InvalidInput`
/// - 画布尺寸溢出 `u32`：`ResourceLimit`
///
/// # 示例
/// ```
/// use aspect_border::compositor::{plan_canvas, AspectRatio};
///
/// let plan = plan_canvas(100, 50, AspectRatio::new(1.0, 1.0), 0)?;
/// assert_eq!((plan.canvas_width, plan.canvas_height), (100, 100));
/// assert_eq!((plan.offset_x, plan.offset_y), (0, 25));
/// # Ok::<(), aspect_border::compositor::ImageError>(())
/// ```
pub fn plan_canvas(
    width: u32,
    height: u32,
    aspect_ratio: AspectRatio,
    thickness: u32,
) -> Result<CanvasPlan, ImageError> {
    if width == 0 || height == 0 {
        return Err(ImageError::InvalidInput(format!(
            "图片尺寸无效：{}x{}",
            width, height
        )));
    }

    let image_ratio = width as f64 / height as f64;
    let target_ratio = aspect_ratio.ratio().unwrap_or(image_ratio);
    let (bounding_width, bounding_height) = fit_bounding_box(width, height, target_ratio);

    let border = thickness
        .checked_mul(2)
        .ok_or_else(|| ImageError::ResourceLimit(format!("边框过厚：{}", thickness)))?;
    let canvas_width = bounding_width
        .checked_add(border)
        .ok_or_else(|| ImageError::ResourceLimit("画布宽度溢出".to_string()))?;
    let canvas_height = bounding_height
        .checked_add(border)
        .ok_or_else(|| ImageError::ResourceLimit("画布高度溢出".to_string()))?;

    Ok(CanvasPlan {
        canvas_width,
        canvas_height,
        bounding_width,
        bounding_height,
        offset_x: (bounding_width - width) / 2 + thickness,
        offset_y: (bounding_height - height) / 2 + thickness,
    })
}

/// 计算不缩放、不裁剪即可容纳原图的最小比例外接框。
///
/// 只在需要补边的那一轴上取整。若原图另一轴恰好是上一次补边取整的结果
/// （等于按比例换算后的取整值，且至少 2 像素），视为已符合比例，不再补边。
fn fit_bounding_box(width: u32, height: u32, target_ratio: f64) -> (u32, u32) {
    let w = width as f64;
    let h = height as f64;

    if w / h > target_ratio {
        // 原图偏宽：补上下
        let fitted_height = to_dimension(w / target_ratio);
        if fitted_height <= height || is_rounded_output(width, h * target_ratio) {
            return (width, height);
        }
        (width, fitted_height)
    } else {
        // 原图偏高或等比：补左右
        let fitted_width = to_dimension(h * target_ratio);
        if fitted_width <= width || is_rounded_output(height, w / target_ratio) {
            return (width, height);
        }
        (fitted_width, height)
    }
}

/// `side` 是否可能由更小的边长按比例补边取整得到。
///
/// 1 像素的边没有更小的来源，不能视为取整结果。
fn is_rounded_output(side: u32, exact: f64) -> bool {
    side >= 2 && side == to_dimension(exact)
}

/// 四舍五入为像素边长，超出 `u32` 时饱和；后续由像素上限拦截。
fn to_dimension(value: f64) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() {
        0
    } else {
        rounded.clamp(0.0, u32::MAX as f64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(plan: &CanvasPlan) -> (u32, u32) {
        (plan.canvas_width, plan.canvas_height)
    }

    fn offset(plan: &CanvasPlan) -> (u32, u32) {
        (plan.offset_x, plan.offset_y)
    }

    #[test]
    fn wide_image_to_square_pads_top_and_bottom() {
        let plan = plan_canvas(100, 50, AspectRatio::new(1.0, 1.0), 0).expect("plan");

        assert_eq!(size(&plan), (100, 100));
        assert_eq!(offset(&plan), (0, 25));
    }

    #[test]
    fn unset_ratio_only_adds_border() {
        let plan = plan_canvas(100, 50, AspectRatio::unset(), 10).expect("plan");

        assert_eq!(size(&plan), (120, 70));
        assert_eq!(offset(&plan), (10, 10));
    }

    #[test]
    fn single_zero_component_is_treated_as_unset() {
        let width_only = plan_canvas(100, 50, AspectRatio::new(16.0, 0.0), 3).expect("plan");
        let height_only = plan_canvas(100, 50, AspectRatio::new(0.0, 9.0), 3).expect("plan");

        assert_eq!(size(&width_only), (106, 56));
        assert_eq!(size(&height_only), (106, 56));
    }

    #[test]
    fn wider_target_pads_left_and_right() {
        let plan = plan_canvas(100, 100, AspectRatio::new(2.0, 1.0), 5).expect("plan");

        assert_eq!((plan.bounding_width, plan.bounding_height), (200, 100));
        assert_eq!(size(&plan), (210, 110));
        assert_eq!(offset(&plan), (55, 5));
    }

    #[test]
    fn taller_target_pads_top_and_bottom() {
        let plan = plan_canvas(90, 160, AspectRatio::new(9.0, 32.0), 0).expect("plan");

        assert_eq!((plan.bounding_width, plan.bounding_height), (90, 320));
        assert_eq!(offset(&plan), (0, 80));
    }

    #[test]
    fn matching_ratio_keeps_image_size() {
        let plan = plan_canvas(1920, 1080, AspectRatio::new(16.0, 9.0), 4).expect("plan");

        assert_eq!(size(&plan), (1928, 1088));
        assert_eq!(offset(&plan), (4, 4));
    }

    #[test]
    fn fractional_box_is_rounded_and_odd_remainder_goes_right() {
        // 50 * 16 / 9 = 88.89 -> 89，余量 39，左 19 右 20
        let plan = plan_canvas(50, 50, AspectRatio::new(16.0, 9.0), 0).expect("plan");

        assert_eq!((plan.bounding_width, plan.bounding_height), (89, 50));
        assert_eq!(offset(&plan), (19, 0));
    }

    #[test]
    fn rounded_output_is_stable_when_replanned() {
        let first = plan_canvas(1, 3, AspectRatio::new(1.0, 2.0), 0).expect("plan");
        assert_eq!(size(&first), (2, 3));

        let second = plan_canvas(2, 3, AspectRatio::new(1.0, 2.0), 0).expect("plan");
        assert_eq!(size(&second), (2, 3));
        assert_eq!(offset(&second), (0, 0));
    }

    #[test]
    fn narrow_target_pads_height_even_when_width_rounds_to_match() {
        // 10 * (1/15) = 0.67 -> 1，但 1 像素宽不可能是补边结果
        let plan = plan_canvas(1, 10, AspectRatio::new(1.0, 15.0), 0).expect("plan");

        assert_eq!(size(&plan), (1, 15));
        assert_eq!(offset(&plan), (0, 2));
    }

    #[test]
    fn wide_target_pads_width_even_when_height_rounds_to_match() {
        let plan = plan_canvas(10, 1, AspectRatio::new(15.0, 1.0), 0).expect("plan");

        assert_eq!(size(&plan), (15, 1));
        assert_eq!(offset(&plan), (2, 0));
    }

    #[test]
    fn padded_output_that_overshoots_ratio_is_kept() {
        // 99x1000 补左右：round(1000 * 0.0996) = 100
        let first = plan_canvas(99, 1000, AspectRatio::new(996.0, 10000.0), 0).expect("plan");
        assert_eq!(size(&first), (100, 1000));

        // 100x1000 比目标略宽，但宽度正是上一次的取整结果，不再补上下
        let second = plan_canvas(100, 1000, AspectRatio::new(996.0, 10000.0), 0).expect("plan");
        assert_eq!(size(&second), (100, 1000));
    }

    #[test]
    fn rounding_up_height_then_replanning_keeps_width() {
        // 10 / 4 = 2.5 -> 3，输出 10x3 比 4:1 略高
        let first = plan_canvas(10, 2, AspectRatio::new(4.0, 1.0), 0).expect("plan");
        assert_eq!(size(&first), (10, 3));

        let second = plan_canvas(10, 3, AspectRatio::new(4.0, 1.0), 0).expect("plan");
        assert_eq!(size(&second), (10, 3));
    }

    #[test]
    fn zero_sized_image_is_rejected() {
        assert!(matches!(
            plan_canvas(0, 10, AspectRatio::unset(), 0),
            Err(ImageError::InvalidInput(_))
        ));
    }

    #[test]
    fn overflowing_border_is_rejected() {
        assert!(matches!(
            plan_canvas(10, 10, AspectRatio::unset(), u32::MAX / 2 + 1),
            Err(ImageError::ResourceLimit(_))
        ));
    }
}
