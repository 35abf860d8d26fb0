//! BeagleBone Black P8/P9 header pin map.

/// Header label to kernel GPIO number (`32 * bank + bit`).
const GPIO_PINS: &[(&str, u32)] = &[
    ("P8_3", 38),
    ("P8_4", 39),
    ("P8_5", 34),
    ("P8_6", 35),
    ("P8_7", 66),
    ("P8_8", 67),
    ("P8_9", 69),
    ("P8_10", 68),
    ("P8_11", 45),
    ("P8_12", 44),
    ("P8_13", 23),
    ("P8_14", 26),
    ("P8_15", 47),
    ("P8_16", 46),
    ("P8_17", 27),
    ("P8_18", 65),
    ("P8_19", 22),
    ("P8_20", 63),
    ("P8_21", 62),
    ("P8_22", 37),
    ("P8_23", 36),
    ("P8_24", 33),
    ("P8_25", 32),
    ("P8_26", 61),
    ("P8_27", 86),
    ("P8_28", 88),
    ("P8_29", 87),
    ("P8_30", 89),
    ("P9_11", 30),
    ("P9_12", 60),
    ("P9_13", 31),
    ("P9_14", 50),
    ("P9_15", 48),
    ("P9_16", 51),
    ("P9_17", 5),
    ("P9_18", 4),
    ("P9_19", 13),
    ("P9_20", 12),
    ("P9_21", 3),
    ("P9_22", 2),
    ("P9_23", 49),
    ("P9_24", 15),
    ("P9_25", 117),
    ("P9_26", 14),
    ("P9_27", 115),
    ("P9_28", 113),
    ("P9_29", 111),
    ("P9_30", 112),
    ("P9_31", 110),
    ("P9_41", 20),
    ("P9_42", 7),
];

/// Header label to ADC channel (`AIN<n>`).
const AIN_PINS: &[(&str, u8)] = &[
    ("P9_39", 0),
    ("P9_40", 1),
    ("P9_37", 2),
    ("P9_38", 3),
    ("P9_33", 4),
    ("P9_36", 5),
    ("P9_35", 6),
];

/// Number of ADC channels on the AM335x.
pub const AIN_CHANNELS: u8 = 7;

fn strip_prefix_ci<'a>(label: &'a str, prefix: &str) -> Option<&'a str> {
    let head = label.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &label[prefix.len()..])
}

/// Resolve a digital identifier to its kernel GPIO number.
///
/// Accepts header labels (`P9_12`) and raw line names (`GPIO60`, `gpio60`).
pub fn gpio_number(label: &str) -> Option<u32> {
    let label = label.trim();
    if let Some((_, n)) = GPIO_PINS
        .iter()
        .find(|(pin, _)| pin.eq_ignore_ascii_case(label))
    {
        return Some(*n);
    }
    strip_prefix_ci(label, "gpio").and_then(|n| n.parse().ok())
}

/// Resolve an analog identifier to its ADC channel.
///
/// Accepts header labels (`P9_33`) and channel names (`AIN4`).
pub fn ain_channel(label: &str) -> Option<u8> {
    let label = label.trim();
    if let Some((_, ch)) = AIN_PINS
        .iter()
        .find(|(pin, _)| pin.eq_ignore_ascii_case(label))
    {
        return Some(*ch);
    }
    strip_prefix_ci(label, "ain")
        .and_then(|n| n.parse().ok())
        .filter(|ch| *ch < AIN_CHANNELS)
}
