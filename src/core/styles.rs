//! Style roles expressed as an enum + macro mapping logical names to `colored::Color`.
//!
//! Coloring is applied only when the `enabled` flag passed to `paint()` is
//! true, so callers decide once (TTY detection, `--color`/`--no-color`) and
//! no global state is needed.
//!
//! ```
//! use handoff::core::styles::StyleRole;
//! assert_eq!(StyleRole::Header.paint("Results", false), "Results");
//! assert!(StyleRole::Header.paint("Results", true).starts_with("\x1b["));
//! ```

use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header  => Some(Color::Yellow),
    Label   => Some(Color::Cyan),
    Value   => None,
    Success => Some(Color::Green),
    Failure => Some(Color::BrightRed),
    Dim     => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn ansi_code(self) -> Option<&'static str> {
        map_color_code(self.color()?)
    }

    pub fn paint(self, text: &str, enabled: bool) -> String {
        match (enabled, self.ansi_code()) {
            (true, Some(code)) => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// Convert StyleRole to prettytable style_spec format
    pub fn to_prettytable_spec(self) -> Option<String> {
        let spec_char = match self.color()? {
            Color::Red => "r",
            Color::Green => "g",
            Color::Yellow => "y",
            Color::Blue => "b",
            Color::Cyan => "c",
            Color::BrightRed => "R",
            Color::BrightBlack => "K",
            _ => return None,
        };

        Some(format!("F{}", spec_char))
    }
}

fn map_color_code(c: Color) -> Option<&'static str> {
    match c {
        Color::Red => Some("31"),
        Color::Green => Some("32"),
        Color::Yellow => Some("33"),
        Color::Blue => Some("34"),
        Color::Cyan => Some("36"),
        Color::BrightBlack => Some("90"),
        Color::BrightRed => Some("91"),
        _ => None,
    }
}
