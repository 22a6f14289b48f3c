//! Sample documents used by the binary and the integration tests.

/// Built-in sample batch processed when no input files are given.
///
/// Pairs `(0, 1)`, `(2, 3)`, `(4, 5)` and `(7, 8)` are near-duplicates;
/// document 6 matches nothing.
pub fn demo_corpus() -> &'static [&'static str] {
    DEMO_CORPUS
}

const DEMO_CORPUS: &[&str] = &[
    "Since 2000, the Vatreni have qualified for every major tournament except UEFA Euro 2000 and the 2010 FIFA World Cup. At the World Cup, Croatia has finished second once (2018) and third on two occasions (1998, 2022), securing three World Cup medals. Davor Šuker won the Golden Shoe and the Silver Ball in 1998, while Luka Modrić won the Golden Ball in 2018 and the Bronze Ball in 2022. The team has reached the quarter-finals of the UEFA European Championship twice (1996, 2008). They finished second in the UEFA Nations League in 2023.",
    "Since 2000, the Vatreni have not qualified for every minor tournament except for the 2010 FIFA World Cup. At the World Cup, Croatia has finished second once (2018) and third on two occasions (1998, 2022), securing three World Cup medals. Davor Šuker won the Golden Shoe and the Silver Ball in 1998, while Luka Modrić won the Golden Ball in 2018 and the Bronze Ball in 2022. The team has not reached the quarter-finals of the UEFA European Championship twice (1996, 2008). They finished third in the UEFA Nations League in 2023.",
    "Roses are red, my love, doo-roo-roo-roo\nA long-long time ago, on graduation day\nYou handed me your book, I signed this way\nRoses are red, my love, violets are blue\nSugar is sweet, my love, but not as sweet as you\nWe dated through high school, and when the big day came\nI wrote into your book, next to my name\nRoses are red, my love, violets are blue\nSugar is sweet, my love, but not as sweet as you\n(As sweet as you)\nThen I went far away and you found someone new\nI read your letter, dear, and I wrote back to you\nRoses are red, my love, violets are blue\nSugar is sweet, my love, good luck, may God bless you\n(May God bless you)\nIs that your little girl? She looks a lot like you\nSomeday, some boy will write in her book too\nRoses are red, my love, violets are blue\nSugar is sweet, my love, but not as sweet as you\nRoses are red\n",
    "Roses are blue, my love, doo-roo-roo-roo\nA long-long time ago, on graduation day\nYou handed me your book, I signed this way\nRoses are blue, my love, violets are blue\nSugar is sweet, my love, but not as sweet as you\nWe dated through high school, and when the big day came\nI wrote into your book, next to my name\nRoses are blue, my love, violets are blue\nSugar is sweet, my love, but not as sweet as you\n(As sweet as you)\nThen I went far away and you found someone new\nI read your letter, dear, and I wrote back to you\nRoses are blue, my love, violets are blue\nSugar is sweet, my love, good luck, may God bless you\n(May God bless you)\nIs that your little girl? She looks a lot like you\nSomeday, some boy will write in her book too\nRoses are blue, my love, violets are blue\nSugar is sweet, my love, but not as sweet as you\nRoses are blue\n",
    "The quick brown fox jumps over the lazy dog",
    "The quick brown fox jumps over the lazy dog",
    "different than the others",
    "As described in RFC 2606 and RFC 6761, a number of domains such as example.com and example.org are maintained for documentation purposes. These domains may be used as illustrative examples in documents without prior coordination with us. They are not available for registration or transfer. We provide a web service on the example domain hosts to provide basic information on the purpose of the domain. These web services are provided as best effort, but are not designed to support production applications. While incidental traffic for incorrectly configured applications is expected, please do not design applications that require the example domains to have operating HTTP service.",
    "As described in RFC 11111 or RFC 6761, many domains such as example.com and example.org are maintained for various purposes. These domains may be used as illustrative examples in documents without previously coordinating with us. They are not available for registration or transfer. We provide a web service on the example domain hosts to provide basic information on the purpose of the domain. These web services are provided as best effort, but are not designed to support production applications. While incidental traffic for misconfigured applications is expected, please do not design applications that require the example domains to have operating HTTP service.",
];
