use ethnum::U256;
use serde::{Deserialize, Deserializer, Serializer};

pub(super) fn serialize<S>(u: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    hex::serde::serialize(u.to_be_bytes(), serializer)
}

pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let text = text.strip_prefix("0x").unwrap_or(&text);

    let mut bytes = [0u8; 32];
    hex::decode_to_slice(text, &mut bytes).map_err(serde::de::Error::custom)?;
    Ok(U256::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use test_strategy::proptest;

    use crate::Element;

    #[proptest]
    fn canonical_element_serialize_bijection(mut element: Element) {
        element.canonicalize();

        let value = serde_json::to_value(element).unwrap();
        let element_again: Element = serde_json::from_value(value).unwrap();

        assert_eq!(element, element_again);
    }
}
