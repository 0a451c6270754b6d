/// Bell-shaped vegetation season: `base` off-season, `base + amplitude` at `peak_day`.
pub fn seasonal_curve(day: f32, peak_day: f32, width: f32, base: f32, amplitude: f32) -> f32 {
    let width = width.max(f32::EPSILON);
    let z = (day - peak_day) / width;
    base + amplitude * (-0.5 * z * z).exp()
}
