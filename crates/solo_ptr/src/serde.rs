use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Deleter, UniquePtr};

// An empty pointer maps to `none`, an owning one to `some(pointee)`.

impl<T, D> Serialize for UniquePtr<T, D>
where
    T: ?Sized + Serialize,
    D: Deleter<T>,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_ref() {
            Some(value) => serializer.serialize_some(value),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for UniquePtr<T> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => UniquePtr::new(value),
            None => UniquePtr::null(),
        })
    }
}
