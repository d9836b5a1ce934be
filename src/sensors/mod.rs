pub mod i2c_sensor;
pub mod lps22hb;
pub mod shtc3;
pub mod tcs34725;

/// Rounds to 2 decimal places, exact ties going to the even digit.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn ties_round_to_even() {
        assert_eq!(round2(1013.125), 1013.12);
        assert_eq!(round2(3.125), 3.12);
        assert_eq!(round2(-23.125), -23.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(26.2486), 26.25);
    }
}
