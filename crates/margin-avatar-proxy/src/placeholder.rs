//! Deterministic placeholder avatars
//!
//! The fill colour is derived from a 32-bit rolling hash over the UTF-16
//! code units of the actor identifier, so every client that renders the
//! same actor agrees on the colour.

use crate::types::AvatarSize;

/// `#rrggbb` colour for an actor identifier
pub fn placeholder_color(actor: &str) -> String {
    let hash = actor.encode_utf16().fold(0i32, |hash, unit| {
        // hash = unit + ((hash << 5) - hash), wrapping at 32 bits
        i32::from(unit).wrapping_add(hash.wrapping_shl(5).wrapping_sub(hash))
    });

    let mut color = String::with_capacity(7);
    color.push('#');
    for i in 0..3 {
        let byte = (hash >> (i * 8)) & 0xff;
        color.push_str(&format!("{:02x}", byte));
    }
    color
}

/// SVG document for a solid square in the actor's colour
pub fn placeholder_svg(actor: &str, size: AvatarSize) -> String {
    let dim = size.placeholder_dimension();
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{dim}" height="{dim}" viewBox="0 0 {dim} {dim}">"#,
            r#"<rect width="{dim}" height="{dim}" fill="{fill}"/>"#,
            "</svg>"
        ),
        dim = dim,
        fill = placeholder_color(actor)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_colors() {
        assert_eq!(placeholder_color(""), "#000000");
        assert_eq!(placeholder_color("a"), "#610000");
        assert_eq!(placeholder_color("alice.test"), "#40f72e");
        assert_eq!(placeholder_color("did:plc:abc123"), "#5e71ec");
        assert_eq!(
            placeholder_color("did:plc:z72i7hdynmk6r22z27h6tvur"),
            "#8cb44b"
        );
    }

    #[test]
    fn test_hashes_utf16_code_units() {
        assert_eq!(placeholder_color("é"), "#e90000");
    }

    #[test]
    fn test_color_is_deterministic() {
        let first = placeholder_color("did:plc:z72i7hdynmk6r22z27h6tvur");
        for _ in 0..10 {
            assert_eq!(placeholder_color("did:plc:z72i7hdynmk6r22z27h6tvur"), first);
        }
    }

    #[test]
    fn test_long_identifier_wraps_without_panic() {
        let actor = "did:web:".to_string() + &"x".repeat(10_000);
        let color = placeholder_color(&actor);
        assert_eq!(color.len(), 7);
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_svg_dimensions() {
        let full = placeholder_svg("alice.test", AvatarSize::Full);
        assert!(full.contains(r#"width="128" height="128""#));

        let tiny = placeholder_svg("alice.test", AvatarSize::Tiny);
        assert!(tiny.contains(r#"width="32" height="32""#));
        assert!(!tiny.contains("128"));
    }

    #[test]
    fn test_svg_rect_uses_actor_color() {
        let svg = placeholder_svg("alice.test", AvatarSize::Full);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r##"<rect width="128" height="128" fill="#40f72e"/>"##));
    }
}
