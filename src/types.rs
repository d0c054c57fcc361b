//! Value types shared by the snapshot model, the container contract and the updater
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a section or cell across two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identity {
    Int(i64),
    Text(String),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Int(value) => write!(f, "{}", value),
            Identity::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for Identity {
    fn from(value: i64) -> Self {
        Identity::Int(value)
    }
}

impl From<i32> for Identity {
    fn from(value: i32) -> Self {
        Identity::Int(value.into())
    }
}

impl From<u32> for Identity {
    fn from(value: u32) -> Self {
        Identity::Int(value.into())
    }
}

impl From<usize> for Identity {
    fn from(value: usize) -> Self {
        // Identities beyond i64::MAX fall back to their decimal text.
        i64::try_from(value)
            .map(Identity::Int)
            .unwrap_or_else(|_| Identity::Text(value.to_string()))
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Identity::Text(value.to_string())
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Identity::Text(value)
    }
}

/// Position of a cell: section index plus item index inside that section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexPath {
    pub section: usize,
    pub item: usize,
}

impl IndexPath {
    pub const fn new(section: usize, item: usize) -> Self {
        IndexPath { section, item }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Clamps each axis into `[min, max]`. A `max` below `min` collapses to `min`.
    pub fn clamped(self, min: Point, max: Point) -> Point {
        Point {
            x: self.x.min(max.x).max(min.x),
            y: self.y.min(max.y).max(min.y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }
}

/// Key a container uses to pool visual instances of one element kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReuseKey(Cow<'static, str>);

impl ReuseKey {
    pub fn new(key: impl Into<Cow<'static, str>>) -> Self {
        ReuseKey(key.into())
    }

    /// Reuse key derived from a Rust type name.
    pub fn of<T: ?Sized + 'static>() -> Self {
        ReuseKey(Cow::Borrowed(std::any::type_name::<T>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReuseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable handle of a live visual instance owned by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u64);

/// Global instance counter (lock-free, atomic)
static INSTANCE_COUNTER: Lazy<AtomicU64> = Lazy::new(|| AtomicU64::new(1));

impl InstanceId {
    /// Allocates a process-wide unique handle.
    pub fn next() -> Self {
        InstanceId(INSTANCE_COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance#{}", self.0)
    }
}

/// Where a visual instance is placed inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Cell(IndexPath),
    Header(usize),
    Footer(usize),
}

/// Animation requested for one kind of edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAnimation {
    Fade,
    Right,
    Left,
    Top,
    Bottom,
    None,
    Middle,
    #[default]
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    Delete,
    Insert,
    Update,
    Move,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditKind::Delete => "DELETE",
            EditKind::Insert => "INSERT",
            EditKind::Update => "UPDATE",
            EditKind::Move => "MOVE",
        })
    }
}
