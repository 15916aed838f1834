use crate::constants::Float;

pub(super) const Q: usize = 7;

pub(super) const C: [[i32; 3]; Q] = [
    [0, 0, 0],
    [1, 0, 0],
    [-1, 0, 0],
    [0, 1, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

pub(super) const W: [Float; Q] = [
    1.0 / 4.0,
    1.0 / 8.0,
    1.0 / 8.0,
    1.0 / 8.0,
    1.0 / 8.0,
    1.0 / 8.0,
    1.0 / 8.0,
];

pub(super) const Q_BAR: [usize; Q] = [0, 2, 1, 4, 3, 6, 5];
