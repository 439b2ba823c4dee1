use crate::style::DesignStyle;

/// Style-conditioned instruction sent with every redesign request.
///
/// The model may only restyle movable furnishings, finishes and decor. Structure and
/// permanent fixtures stay as photographed.
pub fn redesign_instruction(style: DesignStyle) -> String {
    format!(
        "Redesign this room with a {style} aesthetic. STRICT INSTRUCTIONS: \
         1. The architectural layout, including all walls, MUST remain UNCHANGED. \
         Do NOT alter the room's structure. \
         2. If the image contains existing permanent fixtures like kitchen cabinets, \
         kitchen islands, built-in shelving, windows, or doors, you MUST NOT change \
         their style or color. They are to remain as they are in the original image. \
         3. Only modify movable furniture, wall color, floor covering, lighting, and \
         decorative items to match the new {style} style."
    )
}
