pub const TRUTH_PROMPTS: &[&str] = &[
    "What is the most embarrassing song on your playlist?",
    "What's a secret talent nobody here knows about?",
    "Who in this room would you call first in an emergency?",
    "What is the worst gift you have ever received?",
    "What's the pettiest thing you've ever done?",
    "Which app do you spend way too much time on?",
    "What's the last lie you told?",
    "What is your most irrational fear?",
    "What's a food you pretend to like?",
    "Have you ever blamed something on a pet?",
    "What's the strangest dream you remember?",
    "Which fictional character do you secretly relate to?",
    "What is the most childish thing you still do?",
    "What was your most awkward first impression?",
    "What's one thing you would change about your last holiday?",
    "Who was your first celebrity crush?",
];

pub const DARE_PROMPTS: &[&str] = &[
    "Do your best impression of someone in the room.",
    "Speak in a pirate accent until your next turn.",
    "Show the last photo in your camera roll.",
    "Do ten jumping jacks while reciting the alphabet.",
    "Let the group pick a new profile picture for you for an hour.",
    "Sing the chorus of the last song you listened to.",
    "Balance a spoon on your nose for ten seconds.",
    "Talk without closing your mouth for one minute.",
    "Dance with no music for thirty seconds.",
    "Tell a joke. If nobody laughs, tell another.",
    "Narrate the next two minutes like a nature documentary.",
    "Swap seats with the player on your left.",
    "Give a dramatic reading of the last text you sent.",
    "Walk like a runway model across the room.",
    "Hold a plank until your next turn comes around or you give up.",
    "Compliment every player in one breath.",
];
