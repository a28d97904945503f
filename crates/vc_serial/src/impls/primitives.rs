use alloc::string::String;

crate::impl_typed!(bool, char, f32, f64, String);
crate::impl_typed!(i8, i16, i32, i64, i128, isize);
crate::impl_typed!(u8, u16, u32, u64, u128, usize);
