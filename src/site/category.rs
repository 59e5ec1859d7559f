//! Archive sections that can be crawled

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a string names no known archive section
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

/// One section of the news archive
///
/// The string form (`as_str`) is the path segment used in listing URLs and
/// in the names of persisted files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    EuropeStocks,
    BusinessNews,
    WorldNews,
    DomesticNews,
    TechnologyNews,
    CentralBanks,
    InnovationNews,
    AerospaceDefence,
    AutosUpclose,
    EsgNews,
    StocksNews,
    ForeignExchange,
    Gc07,
    ExchangeTradedFunds,
    SpecialReports,
    EuroZone,
    ChinaNews,
    Japan,
    PoliticsNews,
    ScienceNews,
    MediaNews,
    EnvironmentNews,
    Breakingviews,
    PersonalFinance,
}

impl Category {
    /// Every crawlable section, in archive menu order
    pub const ALL: [Category; 24] = [
        Category::EuropeStocks,
        Category::BusinessNews,
        Category::WorldNews,
        Category::DomesticNews,
        Category::TechnologyNews,
        Category::CentralBanks,
        Category::InnovationNews,
        Category::AerospaceDefence,
        Category::AutosUpclose,
        Category::EsgNews,
        Category::StocksNews,
        Category::ForeignExchange,
        Category::Gc07,
        Category::ExchangeTradedFunds,
        Category::SpecialReports,
        Category::EuroZone,
        Category::ChinaNews,
        Category::Japan,
        Category::PoliticsNews,
        Category::ScienceNews,
        Category::MediaNews,
        Category::EnvironmentNews,
        Category::Breakingviews,
        Category::PersonalFinance,
    ];

    /// The archive path segment for this section
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EuropeStocks => "europe-stocks",
            Category::BusinessNews => "businessnews",
            Category::WorldNews => "worldnews",
            Category::DomesticNews => "domesticnews",
            Category::TechnologyNews => "technologynews",
            Category::CentralBanks => "centralbanks",
            Category::InnovationNews => "innovationnews",
            Category::AerospaceDefence => "aerospace-defence",
            Category::AutosUpclose => "autos-upclose",
            Category::EsgNews => "esgnews",
            Category::StocksNews => "stocksnews",
            Category::ForeignExchange => "gca-foreignexchange",
            Category::Gc07 => "gc07",
            Category::ExchangeTradedFunds => "exchange-traded-funds",
            Category::SpecialReports => "specialreports",
            Category::EuroZone => "euro-zone",
            Category::ChinaNews => "china-news",
            Category::Japan => "japan",
            Category::PoliticsNews => "politicsnews",
            Category::ScienceNews => "sciencenews",
            Category::MediaNews => "medianews",
            Category::EnvironmentNews => "environmentnews",
            Category::Breakingviews => "mcbreakingviews",
            Category::PersonalFinance => "personalfinance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
