//! [`Typed`](crate::info::Typed) and container views for built-in types.
//!
//! ## Menu
//!
//! - `bool` `char` `f32` `f64` `String`
//! - `i8` `i16` `i32` `i64` `i128` `isize`
//! - `u8` `u16` `u32` `u64` `u128` `usize`
//! - lists: `Vec<T>`, `VecDeque<T>`, `Cow<'static, [T]>`, `Box<[T]>`, `Arc<[T]>`
//! - sets: `HashSet<T>`, `BTreeSet<T>`
//! - maps: `HashMap<K, V>`, `BTreeMap<K, V>`
//! - shared handles: `Arc<RwLock<T>>`

mod list;
mod map;
mod primitives;
mod set;
mod shared;
