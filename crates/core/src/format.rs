//! Rendering of result sets into numbered chat messages.
//!
//! A single formatter drives every query kind. Each kind contributes a header, an
//! empty-result message, and a line layout (the ordered fields and literals printed after
//! the `{n}- ` ordinal). Ordinals are 1-based and follow the store's row order, so the
//! numbers a user reads are exactly the positions in [`ResultSet`].

use crate::criteria::{CriterionKind, ListingFilter, QueryKind};
use crate::domain::listing::{Listing, ListingId};

/// Rows returned by one filter execution, in store order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    listings: Vec<Listing>,
}

impl ResultSet {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self { listings }
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// `(ordinal, listing)` pairs starting at 1.
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &Listing)> {
        self.listings.iter().enumerate().map(|(index, listing)| (index + 1, listing))
    }

    /// Listing ids in rendered order.
    pub fn ids(&self) -> Vec<ListingId> {
        self.listings.iter().map(|listing| listing.id).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingField {
    Title,
    Area,
    Price,
    Url,
    City,
}

impl ListingField {
    fn render(self, listing: &Listing) -> String {
        match self {
            Self::Title => listing.title.clone(),
            Self::Area => format_number(listing.area),
            Self::Price => format_number(listing.price),
            Self::Url => listing.url.clone(),
            Self::City => listing.city.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Text(&'static str),
    Field(ListingField),
}

use ListingField::{Area, City, Price, Title, Url};
use Segment::{Field, Text};

const CATALOG_LINE: &[Segment] = &[
    Field(Title),
    Text(" à "),
    Field(Area),
    Text(" m² pour $"),
    Field(Price),
    Text(". Plus d'infos: "),
    Field(Url),
];

const CITY_LINE: &[Segment] = &[
    Field(Title),
    Text(" : "),
    Field(Area),
    Text(" m² pour "),
    Field(Price),
    Text("€. Plus d'infos : "),
    Field(Url),
];

const BUDGET_LINE: &[Segment] = &[
    Field(Title),
    Text(" à "),
    Field(City),
    Text(" pour $"),
    Field(Price),
    Text(". Plus d'infos : "),
    Field(Url),
];

const AREA_LINE: &[Segment] =
    &[Field(Title), Text(" pour $"), Field(Price), Text(". Plus d'infos : "), Field(Url)];

const ROOMS_LINE: &[Segment] = &[Field(Title), Text(" pour "), Field(Price), Text("€")];

const HOUSE_TYPE_LINE: &[Segment] = &[
    Field(Title),
    Text(" : "),
    Field(Area),
    Text(" m² pour $"),
    Field(Price),
    Text(". Plus d'infos : "),
    Field(Url),
];

/// Header, empty message and line layout for one executed filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingTemplate {
    pub kind: QueryKind,
    pub header: String,
    pub empty: String,
    pub line: &'static [Segment],
}

impl ListingTemplate {
    pub fn for_filter(filter: &ListingFilter) -> Self {
        let kind = filter.kind();
        let (header, empty, line) = match filter {
            ListingFilter::All => (
                "Voici quelques maisons à vendre :".to_string(),
                "Désolé, il n'y a pas de maisons disponibles à vendre pour le moment.".to_string(),
                CATALOG_LINE,
            ),
            ListingFilter::City(city) => {
                let name = city.display_name();
                (
                    format!("Maisons disponibles à {name} :"),
                    format!("Désolé, il n'y a pas de maisons disponibles à {name} pour le moment."),
                    CITY_LINE,
                )
            }
            ListingFilter::MaxPrice(budget) => {
                let budget = format_number(budget.amount());
                (
                    format!("Maisons dans votre budget de ${budget} :"),
                    format!(
                        "Désolé, il n'y a pas de maisons disponibles dans votre budget de ${budget}."
                    ),
                    BUDGET_LINE,
                )
            }
            ListingFilter::MinArea(threshold) => {
                let area = format_number(threshold.square_meters());
                (
                    format!("Maisons disponibles avec au moins {area} m² :"),
                    format!(
                        "Désolé, il n'y a pas de maisons disponibles avec au moins {area} m²."
                    ),
                    AREA_LINE,
                )
            }
            ListingFilter::MinRooms(rooms) => {
                let rooms = rooms.get();
                (
                    format!("Voici quelques appartements avec {rooms} chambres disponibles :"),
                    format!(
                        "Désolé, il n'y a pas d'appartements avec {rooms} chambres disponibles pour le moment."
                    ),
                    ROOMS_LINE,
                )
            }
            ListingFilter::HouseType(house_type) => {
                let house_type = house_type.as_str();
                (
                    format!("Voici quelques {house_type}s disponibles :"),
                    format!("Désolé, il n'y a pas de {house_type}s disponibles pour le moment."),
                    HOUSE_TYPE_LINE,
                )
            }
        };

        Self { kind, header, empty, line }
    }

    pub fn render(&self, results: &ResultSet) -> String {
        if results.is_empty() {
            return self.empty.clone();
        }

        let mut message = format!("{}\n", self.header);
        for (ordinal, listing) in results.numbered() {
            message.push_str(&self.render_line(ordinal, listing));
            message.push('\n');
        }
        message
    }

    fn render_line(&self, ordinal: usize, listing: &Listing) -> String {
        let mut line = format!("{ordinal}- ");
        for segment in self.line {
            match segment {
                Segment::Text(text) => line.push_str(text),
                Segment::Field(field) => line.push_str(&field.render(listing)),
            }
        }
        line
    }
}

/// Renders the message for one executed filter.
pub fn format_result_set(filter: &ListingFilter, results: &ResultSet) -> String {
    ListingTemplate::for_filter(filter).render(results)
}

/// Shortest decimal rendering: `250000`, `85.5`.
pub fn format_number(value: f64) -> String {
    format!("{value}")
}

impl CriterionKind {
    /// Clarification asked when the slot is empty.
    pub fn missing_prompt(self) -> &'static str {
        match self {
            Self::City => "Veuillez spécifier la ville qui vous intéresse.",
            Self::Budget => "I need to know your budget to search for houses.",
            Self::Area => "I need to know the minimal area to search for houses.",
            Self::RoomCount => "Combien de chambres recherchez-vous ?",
            Self::HouseType => "What type of house are you looking for?",
        }
    }

    /// Clarification asked when the slot cannot be converted.
    pub fn invalid_prompt(self) -> &'static str {
        match self {
            Self::City => "Veuillez fournir un nom de ville valide.",
            Self::Budget => "Please provide a valid budget.",
            Self::Area => "Please provide a valid area.",
            Self::RoomCount => "Veuillez spécifier un nombre valide de chambres.",
            Self::HouseType => "Please provide a valid house type.",
        }
    }
}

impl QueryKind {
    /// Apology sent when no store connection could be acquired.
    pub fn unavailable_message(self) -> &'static str {
        match self {
            Self::City | Self::RoomCount => "Échec de la connexion à la base de données.",
            Self::Catalog | Self::Budget | Self::Area | Self::HouseType => {
                "Failed to connect to the database."
            }
        }
    }

    /// Apology sent when the query itself failed.
    pub fn store_error_message(self) -> &'static str {
        match self {
            Self::City => "Une erreur est survenue lors de la récupération des maisons.",
            Self::RoomCount => {
                "Une erreur s'est produite lors de la récupération des appartements."
            }
            Self::Catalog | Self::Budget | Self::Area | Self::HouseType => {
                "An error occurred while retrieving the houses."
            }
        }
    }
}
