//! Default vocabulary, used when no word-list file is configured.

pub(crate) const WORDS: &[&str] = &[
    "apple", "airplane", "anchor", "banana", "balloon", "bicycle", "bridge",
    "butterfly", "cactus", "camera", "candle", "castle", "cat", "chair",
    "cloud", "clock", "computer", "crown", "diamond", "dinosaur", "dog",
    "dragon", "drum", "elephant", "envelope", "fish", "flower", "football",
    "giraffe", "glasses", "guitar", "hammer", "hat", "helicopter", "house",
    "ice cream", "island", "kangaroo", "key", "kite", "ladder", "lamp",
    "lighthouse", "lion", "moon", "mountain", "mushroom", "octopus",
    "owl", "penguin", "piano", "pizza", "rabbit", "rainbow", "robot",
    "rocket", "sandwich", "scissors", "snail", "snowman", "spider", "star",
    "sun", "sword", "telephone", "tent", "tiger", "tree", "truck",
    "umbrella", "volcano", "watermelon", "whale", "windmill", "zebra",
];
