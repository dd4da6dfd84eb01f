mod serializer;

pub use serializer::{Formatting, JsonProfileSerializer};
