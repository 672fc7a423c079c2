use std::ops::{Add, Sub};

/// An axis-aligned rectangle in integer or float units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect<T> {
    pub x: T,
    pub y: T,
    pub width: T,
    pub height: T,
}

impl<T> Rect<T> {
    pub const fn new(x: T, y: T, width: T, height: T) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

impl<T: Copy + PartialOrd + Default + Add<Output = T> + Sub<Output = T>> Rect<T> {
    /// Build a rectangle from its min and max corners.
    pub fn from_corners(x0: T, y0: T, x1: T, y1: T) -> Self {
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > T::default() && self.height > T::default())
    }

    pub fn contains(&self, pos: Pos<T>) -> bool {
        pos.x >= self.x
            && pos.y >= self.y
            && pos.x < self.x + self.width
            && pos.y < self.y + self.height
    }

    pub fn size(&self) -> Size<T> {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

impl<T> Size<T> {
    pub fn new(width: T, height: T) -> Self {
        Size { width, height }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pos<T> {
    pub x: T,
    pub y: T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rect_is_empty() {
        assert!(Rect::from_corners(0, 0, 0, 0).is_empty());
        assert!(!Rect::new(0, 0, 640, 480).is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::new(10, 10, 5, 5);
        assert!(r.contains(Pos { x: 10, y: 10 }));
        assert!(r.contains(Pos { x: 14, y: 14 }));
        assert!(!r.contains(Pos { x: 15, y: 10 }));
    }
}
