use crate::item::FeedItem;
use chrono::SecondsFormat;
use sha2::{Digest, Sha256};
use std::fmt;

/// Derived key for set membership. Never used for ordering or display.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash of the normalized `(title, link, published_at)` tuple.
///
/// Title whitespace is collapsed, link is trimmed, the date is rendered as
/// RFC 3339 seconds in UTC (empty when absent). Fields are separated by a
/// unit separator so `("ab", "c")` and `("a", "bc")` differ.
pub fn fingerprint(item: &FeedItem) -> Fingerprint {
    let title = item.title.split_whitespace().collect::<Vec<_>>().join(" ");
    let link = item.link.trim();
    let published = item
        .published_at
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(link.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(published.as_bytes());
    Fingerprint(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item() -> FeedItem {
        let mut it = FeedItem::new("Flamengo vence o clássico", "https://ge.globo.com/a");
        it.published_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        it
    }

    #[test]
    fn same_item_same_fingerprint() {
        assert_eq!(fingerprint(&item()), fingerprint(&item()));
        assert_eq!(fingerprint(&item()).to_hex().len(), 64);
    }

    #[test]
    fn ignores_summary_image_and_title_spacing() {
        let mut other = item();
        other.title = "  Flamengo   vence o\nclássico ".to_string();
        other.link = " https://ge.globo.com/a ".to_string();
        other.summary = Some("resumo".to_string());
        other.image_url = Some("https://img/x.jpg".to_string());
        assert_eq!(fingerprint(&item()), fingerprint(&other));
    }

    #[test]
    fn link_and_date_are_significant() {
        let mut moved = item();
        moved.link = "https://ge.globo.com/b".to_string();
        assert_ne!(fingerprint(&item()), fingerprint(&moved));

        let mut undated = item();
        undated.published_at = None;
        assert_ne!(fingerprint(&item()), fingerprint(&undated));
    }

    #[test]
    fn field_boundaries_matter() {
        let a = FeedItem::new("ab", "c");
        let b = FeedItem::new("a", "bc");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
