//! The fixed menu of analytical queries shown on the dashboard.
//!
//! Entries are a closed enumeration: adding one means adding a variant, and
//! every `match` below has to learn about it before the crate compiles.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartHint {
    None,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogEntry {
    ProvidersPerCity,
    QuantityByProviderType,
    ProviderContactsInCity,
    ClaimsPerReceiver,
    AvailableQuantity,
    ListingsPerLocation,
    ListingsPerFoodType,
    ClaimsPerFoodItem,
    CompletedClaimsPerProvider,
    ClaimStatusShare,
    AverageQuantityPerReceiver,
    ClaimsPerMealType,
    QuantityDonatedPerProvider,
}

impl CatalogEntry {
    /// Presentation order.
    pub const ALL: [CatalogEntry; 13] = [
        CatalogEntry::ProvidersPerCity,
        CatalogEntry::QuantityByProviderType,
        CatalogEntry::ProviderContactsInCity,
        CatalogEntry::ClaimsPerReceiver,
        CatalogEntry::AvailableQuantity,
        CatalogEntry::ListingsPerLocation,
        CatalogEntry::ListingsPerFoodType,
        CatalogEntry::ClaimsPerFoodItem,
        CatalogEntry::CompletedClaimsPerProvider,
        CatalogEntry::ClaimStatusShare,
        CatalogEntry::AverageQuantityPerReceiver,
        CatalogEntry::ClaimsPerMealType,
        CatalogEntry::QuantityDonatedPerProvider,
    ];

    /// 1-based position in the menu.
    pub fn number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|entry| entry == self)
            .map(|idx| idx + 1)
            .unwrap_or_default()
    }

    pub fn from_number(number: usize) -> Option<CatalogEntry> {
        number.checked_sub(1).and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogEntry::ProvidersPerCity => "Providers per city",
            CatalogEntry::QuantityByProviderType => "Provider type contribution",
            CatalogEntry::ProviderContactsInCity => "Contact info for providers in a city",
            CatalogEntry::ClaimsPerReceiver => "Receivers who claimed the most",
            CatalogEntry::AvailableQuantity => "Total quantity of available food",
            CatalogEntry::ListingsPerLocation => "City with the most food listings",
            CatalogEntry::ListingsPerFoodType => "Most common food types",
            CatalogEntry::ClaimsPerFoodItem => "Claims per food item",
            CatalogEntry::CompletedClaimsPerProvider => "Provider with most successful claims",
            CatalogEntry::ClaimStatusShare => "Percentage of claim statuses",
            CatalogEntry::AverageQuantityPerReceiver => "Average quantity claimed per receiver",
            CatalogEntry::ClaimsPerMealType => "Most claimed meal type",
            CatalogEntry::QuantityDonatedPerProvider => "Total food donated by each provider",
        }
    }

    pub fn chart_hint(&self) -> ChartHint {
        match self {
            CatalogEntry::QuantityByProviderType
            | CatalogEntry::ClaimsPerReceiver
            | CatalogEntry::ListingsPerLocation
            | CatalogEntry::ListingsPerFoodType
            | CatalogEntry::CompletedClaimsPerProvider
            | CatalogEntry::ClaimsPerMealType
            | CatalogEntry::QuantityDonatedPerProvider => ChartHint::Bar,
            CatalogEntry::ProvidersPerCity
            | CatalogEntry::ProviderContactsInCity
            | CatalogEntry::AvailableQuantity
            | CatalogEntry::ClaimsPerFoodItem
            | CatalogEntry::ClaimStatusShare
            | CatalogEntry::AverageQuantityPerReceiver => ChartHint::None,
        }
    }

    /// Whether the statement takes the city as bound parameter `?1`.
    pub fn takes_city(&self) -> bool {
        matches!(self, CatalogEntry::ProviderContactsInCity)
    }

    pub fn statement(&self) -> &'static str {
        match self {
            CatalogEntry::ProvidersPerCity => {
                "SELECT City, COUNT(Provider_ID) AS NumberOfProviders \
                 FROM Providers GROUP BY City"
            }
            CatalogEntry::QuantityByProviderType => {
                "SELECT Provider_Type, SUM(Quantity) AS TotalQuantity \
                 FROM Food_Listings GROUP BY Provider_Type ORDER BY TotalQuantity DESC"
            }
            CatalogEntry::ProviderContactsInCity => {
                "SELECT Name, Address, Contact FROM Providers WHERE City = ?1"
            }
            CatalogEntry::ClaimsPerReceiver => {
                "SELECT R.Name, COUNT(C.Claim_ID) AS TotalClaims \
                 FROM Claims C JOIN Receivers R ON C.Receiver_ID = R.Receiver_ID \
                 GROUP BY R.Name ORDER BY TotalClaims DESC"
            }
            CatalogEntry::AvailableQuantity => {
                "SELECT SUM(Quantity) AS TotalAvailableQuantity \
                 FROM Food_Listings \
                 WHERE Food_ID NOT IN ( \
                     SELECT Food_ID FROM Claims \
                     WHERE Status = 'Completed' AND Food_ID IS NOT NULL)"
            }
            CatalogEntry::ListingsPerLocation => {
                "SELECT Location, COUNT(Food_ID) AS NumberOfListings \
                 FROM Food_Listings GROUP BY Location ORDER BY NumberOfListings DESC"
            }
            CatalogEntry::ListingsPerFoodType => {
                "SELECT Food_Type, COUNT(Food_ID) AS ListingCount \
                 FROM Food_Listings GROUP BY Food_Type ORDER BY ListingCount DESC"
            }
            CatalogEntry::ClaimsPerFoodItem => {
                "SELECT FL.Food_Name, COUNT(C.Claim_ID) AS NumberOfClaims \
                 FROM Claims AS C JOIN Food_Listings AS FL ON C.Food_ID = FL.Food_ID \
                 GROUP BY FL.Food_Name ORDER BY NumberOfClaims DESC"
            }
            CatalogEntry::CompletedClaimsPerProvider => {
                "SELECT P.Name, COUNT(C.Claim_ID) AS SuccessfulClaims \
                 FROM Claims C \
                 JOIN Food_Listings FL ON C.Food_ID = FL.Food_ID \
                 JOIN Providers P ON FL.Provider_ID = P.Provider_ID \
                 WHERE C.Status = 'Completed' \
                 GROUP BY P.Name ORDER BY SuccessfulClaims DESC"
            }
            // Status is free text: every distinct value gets its own row.
            CatalogEntry::ClaimStatusShare => {
                "SELECT Status, COUNT(*) * 100.0 / (SELECT COUNT(*) FROM Claims) AS Percentage \
                 FROM Claims GROUP BY Status ORDER BY Percentage DESC"
            }
            CatalogEntry::AverageQuantityPerReceiver => {
                "SELECT R.Name, AVG(FL.Quantity) AS AverageQuantityClaimed \
                 FROM Claims AS C \
                 JOIN Food_Listings AS FL ON C.Food_ID = FL.Food_ID \
                 JOIN Receivers AS R ON C.Receiver_ID = R.Receiver_ID \
                 GROUP BY R.Name"
            }
            CatalogEntry::ClaimsPerMealType => {
                "SELECT FL.Meal_Type, COUNT(C.Claim_ID) AS NumberOfClaims \
                 FROM Claims C JOIN Food_Listings FL ON C.Food_ID = FL.Food_ID \
                 GROUP BY FL.Meal_Type ORDER BY NumberOfClaims DESC"
            }
            CatalogEntry::QuantityDonatedPerProvider => {
                "SELECT P.Name, SUM(FL.Quantity) AS TotalQuantityDonated \
                 FROM Food_Listings AS FL JOIN Providers AS P ON FL.Provider_ID = P.Provider_ID \
                 GROUP BY P.Name ORDER BY TotalQuantityDonated DESC"
            }
        }
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}
