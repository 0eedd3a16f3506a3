use super::*;

#[test]
fn hex_round_trip() {
    let c = Rgba8::from_hex("#0f766e").unwrap();
    assert_eq!(c, Rgba8::rgb(0x0f, 0x76, 0x6e));
    assert_eq!(c.to_hex(), "#0f766e");
}

#[test]
fn hex_rejects_malformed_input() {
    assert!(Rgba8::from_hex("0f766e").is_none());
    assert!(Rgba8::from_hex("#0f76").is_none());
    assert!(Rgba8::from_hex("#zz766e").is_none());
}

#[test]
fn css_alpha_is_rounded_and_clamped() {
    assert_eq!(Rgba8::rgba(1, 2, 3, 0.45).a, 115);
    assert_eq!(Rgba8::rgba(1, 2, 3, 4.0).a, 255);
    assert_eq!(Rgba8::rgba(1, 2, 3, -1.0).a, 0);
}

#[test]
fn premultiply_scales_channels_by_alpha() {
    assert_eq!(Rgba8::rgb(200, 100, 0).premultiplied(), [200, 100, 0, 255]);
    let half = Rgba8 {
        r: 200,
        g: 100,
        b: 0,
        a: 128,
    };
    assert_eq!(half.premultiplied(), [100, 50, 0, 128]);
}
