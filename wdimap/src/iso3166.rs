//! Static ISO 3166-1 reference table (alpha-2, alpha-3, numeric and short English name).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsoCountry {
    pub alpha2: &'static str,
    pub alpha3: &'static str,
    pub numeric: u16,
    pub name: &'static str,
}

const fn c(alpha2: &'static str, alpha3: &'static str, numeric: u16, name: &'static str) -> IsoCountry {
    IsoCountry {
        alpha2,
        alpha3,
        numeric,
        name,
    }
}

pub const COUNTRIES: &[IsoCountry] = &[
    c("AF", "AFG", 4, "Afghanistan"),
    c("AX", "ALA", 248, "Åland Islands"),
    c("AL", "ALB", 8, "Albania"),
    c("DZ", "DZA", 12, "Algeria"),
    c("AS", "ASM", 16, "American Samoa"),
    c("AD", "AND", 20, "Andorra"),
    c("AO", "AGO", 24, "Angola"),
    c("AI", "AIA", 660, "Anguilla"),
    c("AQ", "ATA", 10, "Antarctica"),
    c("AG", "ATG", 28, "Antigua and Barbuda"),
    c("AR", "ARG", 32, "Argentina"),
    c("AM", "ARM", 51, "Armenia"),
    c("AW", "ABW", 533, "Aruba"),
    c("AU", "AUS", 36, "Australia"),
    c("AT", "AUT", 40, "Austria"),
    c("AZ", "AZE", 31, "Azerbaijan"),
    c("BS", "BHS", 44, "Bahamas"),
    c("BH", "BHR", 48, "Bahrain"),
    c("BD", "BGD", 50, "Bangladesh"),
    c("BB", "BRB", 52, "Barbados"),
    c("BY", "BLR", 112, "Belarus"),
    c("BE", "BEL", 56, "Belgium"),
    c("BZ", "BLZ", 84, "Belize"),
    c("BJ", "BEN", 204, "Benin"),
    c("BM", "BMU", 60, "Bermuda"),
    c("BT", "BTN", 64, "Bhutan"),
    c("BO", "BOL", 68, "Bolivia, Plurinational State of"),
    c("BQ", "BES", 535, "Bonaire, Sint Eustatius and Saba"),
    c("BA", "BIH", 70, "Bosnia and Herzegovina"),
    c("BW", "BWA", 72, "Botswana"),
    c("BV", "BVT", 74, "Bouvet Island"),
    c("BR", "BRA", 76, "Brazil"),
    c("IO", "IOT", 86, "British Indian Ocean Territory"),
    c("BN", "BRN", 96, "Brunei Darussalam"),
    c("BG", "BGR", 100, "Bulgaria"),
    c("BF", "BFA", 854, "Burkina Faso"),
    c("BI", "BDI", 108, "Burundi"),
    c("CV", "CPV", 132, "Cabo Verde"),
    c("KH", "KHM", 116, "Cambodia"),
    c("CM", "CMR", 120, "Cameroon"),
    c("CA", "CAN", 124, "Canada"),
    c("KY", "CYM", 136, "Cayman Islands"),
    c("CF", "CAF", 140, "Central African Republic"),
    c("TD", "TCD", 148, "Chad"),
    c("CL", "CHL", 152, "Chile"),
    c("CN", "CHN", 156, "China"),
    c("CX", "CXR", 162, "Christmas Island"),
    c("CC", "CCK", 166, "Cocos (Keeling) Islands"),
    c("CO", "COL", 170, "Colombia"),
    c("KM", "COM", 174, "Comoros"),
    c("CG", "COG", 178, "Congo"),
    c("CD", "COD", 180, "Congo, Democratic Republic of the"),
    c("CK", "COK", 184, "Cook Islands"),
    c("CR", "CRI", 188, "Costa Rica"),
    c("CI", "CIV", 384, "Côte d'Ivoire"),
    c("HR", "HRV", 191, "Croatia"),
    c("CU", "CUB", 192, "Cuba"),
    c("CW", "CUW", 531, "Curaçao"),
    c("CY", "CYP", 196, "Cyprus"),
    c("CZ", "CZE", 203, "Czechia"),
    c("DK", "DNK", 208, "Denmark"),
    c("DJ", "DJI", 262, "Djibouti"),
    c("DM", "DMA", 212, "Dominica"),
    c("DO", "DOM", 214, "Dominican Republic"),
    c("EC", "ECU", 218, "Ecuador"),
    c("EG", "EGY", 818, "Egypt"),
    c("SV", "SLV", 222, "El Salvador"),
    c("GQ", "GNQ", 226, "Equatorial Guinea"),
    c("ER", "ERI", 232, "Eritrea"),
    c("EE", "EST", 233, "Estonia"),
    c("SZ", "SWZ", 748, "Eswatini"),
    c("ET", "ETH", 231, "Ethiopia"),
    c("FK", "FLK", 238, "Falkland Islands (Malvinas)"),
    c("FO", "FRO", 234, "Faroe Islands"),
    c("FJ", "FJI", 242, "Fiji"),
    c("FI", "FIN", 246, "Finland"),
    c("FR", "FRA", 250, "France"),
    c("GF", "GUF", 254, "French Guiana"),
    c("PF", "PYF", 258, "French Polynesia"),
    c("TF", "ATF", 260, "French Southern Territories"),
    c("GA", "GAB", 266, "Gabon"),
    c("GM", "GMB", 270, "Gambia"),
    c("GE", "GEO", 268, "Georgia"),
    c("DE", "DEU", 276, "Germany"),
    c("GH", "GHA", 288, "Ghana"),
    c("GI", "GIB", 292, "Gibraltar"),
    c("GR", "GRC", 300, "Greece"),
    c("GL", "GRL", 304, "Greenland"),
    c("GD", "GRD", 308, "Grenada"),
    c("GP", "GLP", 312, "Guadeloupe"),
    c("GU", "GUM", 316, "Guam"),
    c("GT", "GTM", 320, "Guatemala"),
    c("GG", "GGY", 831, "Guernsey"),
    c("GN", "GIN", 324, "Guinea"),
    c("GW", "GNB", 624, "Guinea-Bissau"),
    c("GY", "GUY", 328, "Guyana"),
    c("HT", "HTI", 332, "Haiti"),
    c("HM", "HMD", 334, "Heard Island and McDonald Islands"),
    c("VA", "VAT", 336, "Holy See"),
    c("HN", "HND", 340, "Honduras"),
    c("HK", "HKG", 344, "Hong Kong"),
    c("HU", "HUN", 348, "Hungary"),
    c("IS", "ISL", 352, "Iceland"),
    c("IN", "IND", 356, "India"),
    c("ID", "IDN", 360, "Indonesia"),
    c("IR", "IRN", 364, "Iran, Islamic Republic of"),
    c("IQ", "IRQ", 368, "Iraq"),
    c("IE", "IRL", 372, "Ireland"),
    c("IM", "IMN", 833, "Isle of Man"),
    c("IL", "ISR", 376, "Israel"),
    c("IT", "ITA", 380, "Italy"),
    c("JM", "JAM", 388, "Jamaica"),
    c("JP", "JPN", 392, "Japan"),
    c("JE", "JEY", 832, "Jersey"),
    c("JO", "JOR", 400, "Jordan"),
    c("KZ", "KAZ", 398, "Kazakhstan"),
    c("KE", "KEN", 404, "Kenya"),
    c("KI", "KIR", 296, "Kiribati"),
    c("KP", "PRK", 408, "Korea, Democratic People's Republic of"),
    c("KR", "KOR", 410, "Korea, Republic of"),
    c("KW", "KWT", 414, "Kuwait"),
    c("KG", "KGZ", 417, "Kyrgyzstan"),
    c("LA", "LAO", 418, "Lao People's Democratic Republic"),
    c("LV", "LVA", 428, "Latvia"),
    c("LB", "LBN", 422, "Lebanon"),
    c("LS", "LSO", 426, "Lesotho"),
    c("LR", "LBR", 430, "Liberia"),
    c("LY", "LBY", 434, "Libya"),
    c("LI", "LIE", 438, "Liechtenstein"),
    c("LT", "LTU", 440, "Lithuania"),
    c("LU", "LUX", 442, "Luxembourg"),
    c("MO", "MAC", 446, "Macao"),
    c("MG", "MDG", 450, "Madagascar"),
    c("MW", "MWI", 454, "Malawi"),
    c("MY", "MYS", 458, "Malaysia"),
    c("MV", "MDV", 462, "Maldives"),
    c("ML", "MLI", 466, "Mali"),
    c("MT", "MLT", 470, "Malta"),
    c("MH", "MHL", 584, "Marshall Islands"),
    c("MQ", "MTQ", 474, "Martinique"),
    c("MR", "MRT", 478, "Mauritania"),
    c("MU", "MUS", 480, "Mauritius"),
    c("YT", "MYT", 175, "Mayotte"),
    c("MX", "MEX", 484, "Mexico"),
    c("FM", "FSM", 583, "Micronesia, Federated States of"),
    c("MD", "MDA", 498, "Moldova, Republic of"),
    c("MC", "MCO", 492, "Monaco"),
    c("MN", "MNG", 496, "Mongolia"),
    c("ME", "MNE", 499, "Montenegro"),
    c("MS", "MSR", 500, "Montserrat"),
    c("MA", "MAR", 504, "Morocco"),
    c("MZ", "MOZ", 508, "Mozambique"),
    c("MM", "MMR", 104, "Myanmar"),
    c("NA", "NAM", 516, "Namibia"),
    c("NR", "NRU", 520, "Nauru"),
    c("NP", "NPL", 524, "Nepal"),
    c("NL", "NLD", 528, "Netherlands"),
    c("NC", "NCL", 540, "New Caledonia"),
    c("NZ", "NZL", 554, "New Zealand"),
    c("NI", "NIC", 558, "Nicaragua"),
    c("NE", "NER", 562, "Niger"),
    c("NG", "NGA", 566, "Nigeria"),
    c("NU", "NIU", 570, "Niue"),
    c("NF", "NFK", 574, "Norfolk Island"),
    c("MK", "MKD", 807, "North Macedonia"),
    c("MP", "MNP", 580, "Northern Mariana Islands"),
    c("NO", "NOR", 578, "Norway"),
    c("OM", "OMN", 512, "Oman"),
    c("PK", "PAK", 586, "Pakistan"),
    c("PW", "PLW", 585, "Palau"),
    c("PS", "PSE", 275, "Palestine, State of"),
    c("PA", "PAN", 591, "Panama"),
    c("PG", "PNG", 598, "Papua New Guinea"),
    c("PY", "PRY", 600, "Paraguay"),
    c("PE", "PER", 604, "Peru"),
    c("PH", "PHL", 608, "Philippines"),
    c("PN", "PCN", 612, "Pitcairn"),
    c("PL", "POL", 616, "Poland"),
    c("PT", "PRT", 620, "Portugal"),
    c("PR", "PRI", 630, "Puerto Rico"),
    c("QA", "QAT", 634, "Qatar"),
    c("RE", "REU", 638, "Réunion"),
    c("RO", "ROU", 642, "Romania"),
    c("RU", "RUS", 643, "Russian Federation"),
    c("RW", "RWA", 646, "Rwanda"),
    c("BL", "BLM", 652, "Saint Barthélemy"),
    c("SH", "SHN", 654, "Saint Helena, Ascension and Tristan da Cunha"),
    c("KN", "KNA", 659, "Saint Kitts and Nevis"),
    c("LC", "LCA", 662, "Saint Lucia"),
    c("MF", "MAF", 663, "Saint Martin (French part)"),
    c("PM", "SPM", 666, "Saint Pierre and Miquelon"),
    c("VC", "VCT", 670, "Saint Vincent and the Grenadines"),
    c("WS", "WSM", 882, "Samoa"),
    c("SM", "SMR", 674, "San Marino"),
    c("ST", "STP", 678, "Sao Tome and Principe"),
    c("SA", "SAU", 682, "Saudi Arabia"),
    c("SN", "SEN", 686, "Senegal"),
    c("RS", "SRB", 688, "Serbia"),
    c("SC", "SYC", 690, "Seychelles"),
    c("SL", "SLE", 694, "Sierra Leone"),
    c("SG", "SGP", 702, "Singapore"),
    c("SX", "SXM", 534, "Sint Maarten (Dutch part)"),
    c("SK", "SVK", 703, "Slovakia"),
    c("SI", "SVN", 705, "Slovenia"),
    c("SB", "SLB", 90, "Solomon Islands"),
    c("SO", "SOM", 706, "Somalia"),
    c("ZA", "ZAF", 710, "South Africa"),
    c("GS", "SGS", 239, "South Georgia and the South Sandwich Islands"),
    c("SS", "SSD", 728, "South Sudan"),
    c("ES", "ESP", 724, "Spain"),
    c("LK", "LKA", 144, "Sri Lanka"),
    c("SD", "SDN", 729, "Sudan"),
    c("SR", "SUR", 740, "Suriname"),
    c("SJ", "SJM", 744, "Svalbard and Jan Mayen"),
    c("SE", "SWE", 752, "Sweden"),
    c("CH", "CHE", 756, "Switzerland"),
    c("SY", "SYR", 760, "Syrian Arab Republic"),
    c("TW", "TWN", 158, "Taiwan, Province of China"),
    c("TJ", "TJK", 762, "Tajikistan"),
    c("TZ", "TZA", 834, "Tanzania, United Republic of"),
    c("TH", "THA", 764, "Thailand"),
    c("TL", "TLS", 626, "Timor-Leste"),
    c("TG", "TGO", 768, "Togo"),
    c("TK", "TKL", 772, "Tokelau"),
    c("TO", "TON", 776, "Tonga"),
    c("TT", "TTO", 780, "Trinidad and Tobago"),
    c("TN", "TUN", 788, "Tunisia"),
    c("TR", "TUR", 792, "Türkiye"),
    c("TM", "TKM", 795, "Turkmenistan"),
    c("TC", "TCA", 796, "Turks and Caicos Islands"),
    c("TV", "TUV", 798, "Tuvalu"),
    c("UG", "UGA", 800, "Uganda"),
    c("UA", "UKR", 804, "Ukraine"),
    c("AE", "ARE", 784, "United Arab Emirates"),
    c("GB", "GBR", 826, "United Kingdom of Great Britain and Northern Ireland"),
    c("US", "USA", 840, "United States of America"),
    c("UM", "UMI", 581, "United States Minor Outlying Islands"),
    c("UY", "URY", 858, "Uruguay"),
    c("UZ", "UZB", 860, "Uzbekistan"),
    c("VU", "VUT", 548, "Vanuatu"),
    c("VE", "VEN", 862, "Venezuela, Bolivarian Republic of"),
    c("VN", "VNM", 704, "Viet Nam"),
    c("VG", "VGB", 92, "Virgin Islands (British)"),
    c("VI", "VIR", 850, "Virgin Islands (U.S.)"),
    c("WF", "WLF", 876, "Wallis and Futuna"),
    c("EH", "ESH", 732, "Western Sahara"),
    c("YE", "YEM", 887, "Yemen"),
    c("ZM", "ZMB", 894, "Zambia"),
    c("ZW", "ZWE", 716, "Zimbabwe"),
];

/// Look up a country by its alpha-3 code (case sensitive, as the sources use upper case).
pub fn by_alpha3(alpha3: &str) -> Option<&'static IsoCountry> {
    COUNTRIES.iter().find(|country| country.alpha3 == alpha3)
}

pub fn is_alpha3(code: &str) -> bool {
    by_alpha3(code).is_some()
}

/// All alpha-3 codes, used as the membership set when filtering joined tables
pub fn alpha3_codes() -> Vec<&'static str> {
    COUNTRIES.iter().map(|country| country.alpha3).collect()
}
