/// Classification of the input that triggered a draw.
///
/// Carries no geometry; a color scheme uses it to pick a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawEvent {
    MouseMove,
    Keystroke,
    LMousePress,
    MoveOuterCircle,
    MoveInnerCircle,
    Background,
}
