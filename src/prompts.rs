//! The instruction prompt sent to every vision provider.
//!
//! All three adapters send the same text so that swapping backends changes
//! only the transport, never what the model is asked to produce.

/// Asks the model to extract one recipe from the attached page images into a
/// JSON object and to reply with JSON only.
pub const RECIPE_EXTRACTION_PROMPT: &str = r#"Analyze this recipe image and extract all information into a JSON object with these fields:
- title: recipe name
- servings: number of servings
- prep_time: preparation time
- cook_time: cooking time
- total_time: total time (if specified)
- ingredients: array of ingredient objects with 'amount', 'unit', 'item', and optional 'notes'
- instructions: array of step-by-step instructions (numbered if possible)
- tags: array of relevant tags (e.g., "vegetarian", "dessert", "quick", "easy")
- cuisine: type of cuisine (if identifiable)
- difficulty: difficulty level (if specified)

Return ONLY valid JSON, no other text."#;
