//! Fixed word lists for the lexical sections. Kept static for reproducibility.

pub const PLANTS: &[&str] = &[
    "Pine", "Birch", "Oak", "Maple", "Willow", "Poplar", "Cedar", "Fern", "Moss", "Tulip",
    "Daisy", "Rose", "Lily", "Sunflower", "Potato", "Onion", "Garlic", "Wheat", "Barley", "Oats",
    "Cotton", "Carrot", "Cucumber", "Cabbage",
];

pub const ANIMALS: &[&str] = &[
    "Dog", "Cat", "Cow", "Sheep", "Goat", "Camel", "Horse", "Deer", "Wolf", "Fox", "Bear",
    "Rabbit", "Mouse", "Eagle", "Chicken", "Pig", "Frog", "Salmon", "Turtle", "Lion", "Tiger",
    "Owl", "Zebra", "Otter",
];

pub const ONE_SYLLABLE: &[&str] = &[
    "sun", "moon", "hill", "road", "snow", "tree", "book", "hand", "milk", "bread", "fish",
    "stone", "rain", "wind", "bird", "chair", "lamp", "door", "ship", "cloud", "sand", "leaf",
    "star", "bell",
];

pub const TWO_SYLLABLES: &[&str] = &[
    "garden", "river", "window", "paper", "table", "pencil", "winter", "summer", "doctor",
    "music", "yellow", "basket", "candle", "mirror", "rabbit", "forest", "pillow", "kitten",
    "button", "ladder", "engine", "silver", "castle", "turkey",
];
