use ndarray::Array1;

fn to_array(values: &[f32]) -> Array1<f64> {
    values.iter().map(|&v| v as f64).collect()
}

/// Euclidean norm, computed in f64
pub fn l2_norm(values: &[f32]) -> f64 {
    let v = to_array(values);
    v.dot(&v).sqrt()
}
