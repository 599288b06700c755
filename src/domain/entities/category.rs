use std::str::FromStr;

/// Icon used for stored category values outside the closed set.
const FALLBACK_ICON: &str = "📌";

/// The closed set of knowledge-base categories.
///
/// Stored as plain text in `guide_content.category`. Every user-facing
/// surface (sections listing, labels, icons) goes through this one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Neighborhoods,
    Attractions,
    Restaurants,
    Hotels,
    Transportation,
    Shopping,
    CulturalExperiences,
    DayTrips,
    PracticalTips,
    Itinerary,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Neighborhoods,
        Category::Attractions,
        Category::Restaurants,
        Category::Hotels,
        Category::Transportation,
        Category::Shopping,
        Category::CulturalExperiences,
        Category::DayTrips,
        Category::PracticalTips,
        Category::Itinerary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Neighborhoods => "neighborhoods",
            Category::Attractions => "attractions",
            Category::Restaurants => "restaurants",
            Category::Hotels => "hotels",
            Category::Transportation => "transportation",
            Category::Shopping => "shopping",
            Category::CulturalExperiences => "cultural_experiences",
            Category::DayTrips => "day_trips",
            Category::PracticalTips => "practical_tips",
            Category::Itinerary => "itinerary",
        }
    }

    pub fn label_hebrew(&self) -> &'static str {
        match self {
            Category::Neighborhoods => "שכונות ואזורים",
            Category::Attractions => "אטרקציות וציוני דרך",
            Category::Restaurants => "מסעדות ואוכל",
            Category::Hotels => "מלונות ולינה",
            Category::Transportation => "תחבורה",
            Category::Shopping => "קניות",
            Category::CulturalExperiences => "חוויות תרבותיות",
            Category::DayTrips => "טיולי יום",
            Category::PracticalTips => "טיפים שימושיים",
            Category::Itinerary => "הצעות למסלולים",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Neighborhoods => "🏘️",
            Category::Attractions => "⛩️",
            Category::Restaurants => "🍜",
            Category::Hotels => "🏨",
            Category::Transportation => "🚃",
            Category::Shopping => "🛍️",
            Category::CulturalExperiences => "🎎",
            Category::DayTrips => "🗻",
            Category::PracticalTips => "💡",
            Category::Itinerary => "🗺️",
        }
    }

    /// Hebrew label and icon for a stored category value.
    ///
    /// Values outside the closed set keep their raw name and get a pin icon,
    /// so a listing never fails on unexpected seeded data.
    pub fn display_meta(value: &str) -> (String, String) {
        match value.parse::<Category>() {
            Ok(category) => (
                category.label_hebrew().to_string(),
                category.icon().to_string(),
            ),
            Err(_) => (value.to_string(), FALLBACK_ICON.to_string()),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neighborhoods" => Ok(Category::Neighborhoods),
            "attractions" => Ok(Category::Attractions),
            "restaurants" => Ok(Category::Restaurants),
            "hotels" => Ok(Category::Hotels),
            "transportation" => Ok(Category::Transportation),
            "shopping" => Ok(Category::Shopping),
            "cultural_experiences" => Ok(Category::CulturalExperiences),
            "day_trips" => Ok(Category::DayTrips),
            "practical_tips" => Ok(Category::PracticalTips),
            "itinerary" => Ok(Category::Itinerary),
            _ => Err(format!("Invalid Category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
