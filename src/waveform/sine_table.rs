/// Entries in the quarter-wave table
pub const SINE_TABLE_LEN: usize = 76;

/// Quarter-wave sine offsets from [`MID_CODE`](super::MID_CODE), `0` to the full amplitude of
/// 1024 codes.
pub const SINE_OFFSETS: [u16; SINE_TABLE_LEN] = [
    0, 21, 43, 64, 86, 107, 128, 150, //
    171, 192, 213, 234, 255, 275, 296, 316, //
    337, 357, 377, 397, 417, 436, 455, 474, //
    493, 512, 530, 549, 567, 584, 602, 619, //
    636, 653, 669, 685, 701, 716, 732, 747, //
    761, 775, 789, 803, 816, 828, 841, 853, //
    865, 876, 887, 897, 908, 917, 927, 936, //
    944, 952, 960, 967, 974, 980, 986, 992, //
    997, 1002, 1006, 1010, 1013, 1016, 1018, 1020, //
    1022, 1023, 1024, 1024,
];
