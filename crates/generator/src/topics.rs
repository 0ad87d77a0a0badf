//! Fixed topic catalog. Each replenishment asks for jokes about one topic
//! drawn uniformly from this list.

pub const TOPICS: &[&str] = &[
    "comedy",
    "history",
    "coding",
    "fantasy",
    "animals",
    "chemistry",
    "technology",
    "languages",
    "futuristic gadgets",
    "festivals",
    "airplanes",
    "social media",
    "circus",
    "evolution",
    "farming",
    "bicycles",
    "board games",
    "ocean exploration",
    "castles",
    "finance",
    "riddles",
    "theme parks",
    "music",
    "ancient civilizations",
    "programming",
    "pirates",
    "quantum physics",
    "desserts",
    "espionage",
    "stand-up",
    "aliens",
    "roller coasters",
    "computers",
    "school life",
    "modern art",
    "wildlife",
    "crime",
    "science experiments",
    "magic",
    "space",
    "legends",
    "video games",
    "college life",
    "painting",
    "photography",
    "writing",
    "startups",
    "space travel",
    "history lessons",
    "cooking",
    "travel",
    "philosophy",
    "trains",
    "parenting",
    "chess",
    "education",
    "gardening",
    "hobbies",
    "puzzles",
    "dinosaurs",
    "movies",
    "fashion",
    "books",
    "rivers",
    "office pranks",
    "urban myths",
    "superstitions",
    "games",
    "artificial intelligence",
    "renaissance",
    "beaches",
    "architecture",
    "time travel",
    "spies",
    "nature",
    "villains",
    "cars",
    "psychology",
    "mountains",
    "online dating",
    "weather",
    "city life",
    "robots",
    "pets",
    "fables",
    "inventions",
    "astronomy",
];

pub fn random_topic() -> &'static str {
    TOPICS[fastrand::usize(..TOPICS.len())]
}
