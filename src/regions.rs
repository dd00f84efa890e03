//! Administrative divisions of Uzbekistan used by the registration keyboards.

pub struct Region {
    pub name: &'static str,
    pub districts: &'static [District],
}

pub struct District {
    pub name: &'static str,
    pub mahallas: &'static [&'static str],
}

pub fn region_names() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|r| r.name)
}

pub fn find_region(name: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name == name)
}

pub fn districts(region: &str) -> Vec<&'static str> {
    find_region(region)
        .map(|r| r.districts.iter().map(|d| d.name).collect())
        .unwrap_or_default()
}

pub fn mahallas(region: &str, district: &str) -> &'static [&'static str] {
    find_region(region)
        .and_then(|r| r.districts.iter().find(|d| d.name == district))
        .map(|d| d.mahallas)
        .unwrap_or_default()
}

pub fn is_known_region(name: &str) -> bool {
    find_region(name).is_some()
}

pub fn is_known_district(region: &str, district: &str) -> bool {
    find_region(region).is_some_and(|r| r.districts.iter().any(|d| d.name == district))
}

#[rustfmt::skip]
static REGIONS: &[Region] = &[
    Region {
        name: "Toshkent shahri",
        districts: &[
            District { name: "Bektemir", mahallas: &["Kuyluk", "Sarabon", "Bunyodkor", "Quyosh", "Guliston"] },
            District { name: "Chilonzor", mahallas: &["Chilonzor", "Kimyogarlar", "Namuna", "Chilonzor-1", "Chilonzor-2"] },
            District { name: "Mirobod", mahallas: &["Mirobod", "Ulugbek", "Makhmudov", "Markaziy", "Sharq"] },
            District { name: "Mirzo Ulugbek", mahallas: &["Qoraqamish", "Beruni", "Maksim Gorkiy", "Ibn Sino", "Nurafshon"] },
            District { name: "Olmazar", mahallas: &["Olmazar", "Mavlon Qori", "Bobur", "Farobiy", "Tinchlik"] },
            District { name: "Sergeli", mahallas: &["Sergeli", "Qipchoq", "Yangi Sergeli", "Dustlik", "Mehnat"] },
            District { name: "Shayhontohur", mahallas: &["Shayhontohur", "Berdaq", "Pakhtakor", "Markaziy", "Yangi Hayot"] },
            District { name: "Uchtepa", mahallas: &["Uchtepa", "Kukcha", "Qadamjoy", "Bog'ishamol", "Gulshan"] },
            District { name: "Yakkasaroy", mahallas: &["Yakkasaroy", "Kucha", "Vodnik", "Markaziy", "Parkent"] },
            District { name: "Yashnobod", mahallas: &["Yashnobod", "Shifokor", "Muqimiy", "Navoi", "Istiqlol"] },
            District { name: "Yunusobod", mahallas: &["Yunusobod", "Buyuk Ipak Yoli", "Bobur", "Amir Temur", "Mustaqillik"] },
            District { name: "Yashil", mahallas: &["Yashil", "Doston", "Temur Malik", "Bog'bon", "Tinchlik"] },
        ],
    },
    Region {
        name: "Andijon",
        districts: &[
            District { name: "Andijon shahri", mahallas: &["Markaziy", "Sharqiy", "Shimoliy", "G'arbiy", "Janubiy"] },
            District { name: "Asaka", mahallas: &["Asaka", "Kasr", "Navoiy", "Guliston", "Mustaqillik"] },
            District { name: "Baliqchi", mahallas: &["Baliqchi", "Yangiqishloq", "Qoraqum", "Bog'bon", "Tinchlik"] },
            District { name: "Bo'z", mahallas: &["Bo'z", "Xonobod", "Yangi Hayot", "Istiqlol", "Mehnat"] },
            District { name: "Buloqboshi", mahallas: &["Buloqboshi", "Tinchlik", "Mustaqillik", "Gulistan", "Navoi"] },
            District { name: "Izboskan", mahallas: &["Izboskan", "Markaziy", "Qishloq", "Dustlik", "Yangiobod"] },
            District { name: "Jalaquduq", mahallas: &["Jalaquduq", "Bog'ishamol", "Gulzor", "Mehnat", "Istiqlol"] },
            District { name: "Marhamat", mahallas: &["Marhamat", "Yangi Marhamat", "Guliston", "Tinchlik", "Navoi"] },
            District { name: "Oltinko'l", mahallas: &["Oltinko'l", "Markaziy", "Bog'bon", "Dustlik", "Yangiariq"] },
            District { name: "Paxtaobod", mahallas: &["Paxtaobod", "Gulistan", "Mehnat", "Istiqlol", "Navoi"] },
            District { name: "Paytug'", mahallas: &["Paytug'", "Markaziy", "Yangiqishloq", "Bog'bon", "Tinchlik"] },
            District { name: "Qo'rg'ontepa", mahallas: &["Qo'rg'ontepa", "Gulzor", "Dustlik", "Yangiobod", "Mehnat"] },
            District { name: "Shahriston", mahallas: &["Shahriston", "Markaziy", "Bog'ishamol", "Gulistan", "Navoi"] },
            District { name: "Xo'jaobod", mahallas: &["Xo'jaobod", "Yangiariq", "Tinchlik", "Istiqlol", "Mehnat"] },
        ],
    },
    Region {
        name: "Buxoro",
        districts: &[
            District { name: "Buxoro shahri", mahallas: &["Abu Ali ibn Sino", "Ismoil Somoniy", "Markaziy", "Sharq", "G'arb"] },
            District { name: "Kogon", mahallas: &["Kogon", "Dustlik", "Yangi Hayot", "Gulistan", "Navoi"] },
            District { name: "Olot", mahallas: &["Olot", "Tinchlik", "Guliston", "Bog'bon", "Mehrat"] },
            District { name: "Peshku", mahallas: &["Peshku", "Bog'bon", "Yangiariq", "Dustlik", "Istiqlol"] },
            District { name: "Qorako'l", mahallas: &["Qorako'l", "Samarkand", "Istiqlol", "Gulzor", "Navoi"] },
            District { name: "Buxoro tumani", mahallas: &["Markaziy", "Yangiqishloq", "Bog'ishamol", "Gulistan", "Dustlik"] },
            District { name: "G'ijduvon", mahallas: &["G'ijduvon", "Markaziy", "Bog'bon", "Tinchlik", "Yangiariq"] },
            District { name: "Jondor", mahallas: &["Jondor", "Gulzor", "Mehnat", "Istiqlol", "Navoi"] },
            District { name: "Qorovulbozor", mahallas: &["Qorovulbozor", "Bog'ishamol", "Dustlik", "Gulistan", "Tinchlik"] },
            District { name: "Romitan", mahallas: &["Romitan", "Markaziy", "Yangiariq", "Bog'bon", "Mehrat"] },
            District { name: "Shofirkon", mahallas: &["Shofirkon", "Gulzor", "Istiqlol", "Navoi", "Dustlik"] },
            District { name: "Vobkent", mahallas: &["Vobkent", "Bog'ishamol", "Gulistan", "Tinchlik", "Yangiariq"] },
        ],
    },
    Region {
        name: "Jizzax",
        districts: &[
            District { name: "Jizzax shahri", mahallas: &["Markaziy", "Istiqlol", "Mustaqillik", "Sharq", "G'arb"] },
            District { name: "Arnasoy", mahallas: &["Arnasoy", "Tinchlik", "Yangiyer", "Bog'bon", "Gulzor"] },
            District { name: "Baxtiyor", mahallas: &["Baxtiyor", "Guliston", "Mehnat", "Dustlik", "Navoi"] },
            District { name: "Do'stlik", mahallas: &["Do'stlik", "Yangi Hayot", "Bog'bon", "Istiqlol", "Tinchlik"] },
            District { name: "Forish", mahallas: &["Forish", "Qizilcha", "Yangiqishloq", "Gulzor", "Mehrat"] },
            District { name: "Baxmal", mahallas: &["Baxmal", "Markaziy", "Bog'ishamol", "Dustlik", "Yangiariq"] },
            District { name: "Chiroqchi", mahallas: &["Chiroqchi", "Gulistan", "Tinchlik", "Navoi", "Istiqlol"] },
            District { name: "G'allaorol", mahallas: &["G'allaorol", "Bog'bon", "Mehrat", "Gulzor", "Dustlik"] },
            District { name: "Zafarobod", mahallas: &["Zafarobod", "Yangiqishloq", "Istiqlol", "Tinchlik", "Navoi"] },
            District { name: "Zarbdor", mahallas: &["Zarbdor", "Bog'ishamol", "Gulistan", "Mehrat", "Yangiariq"] },
            District { name: "Zomin", mahallas: &["Zomin", "Markaziy", "Dustlik", "Bog'bon", "Gulzor"] },
            District { name: "Mirzacho'l", mahallas: &["Mirzacho'l", "Yangiobod", "Tinchlik", "Istiqlol", "Navoi"] },
        ],
    },
    Region {
        name: "Qashqadaryo",
        districts: &[
            District { name: "Qarshi", mahallas: &["Markaziy", "Nishon", "Nasaf", "Sharq", "Shimol"] },
            District { name: "Dehqonobod", mahallas: &["Dehqonobod", "Guliston", "Yangi Hayot", "Bog'bon", "Dustlik"] },
            District { name: "Qamashi", mahallas: &["Qamashi", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Koson", mahallas: &["Koson", "Istiqlol", "Mustaqillik", "Gulzor", "Navoi"] },
            District { name: "Kitob", mahallas: &["Kitob", "Yangiariq", "Mehnat", "Bog'ishamol", "Dustlik"] },
            District { name: "Chiroqchi", mahallas: &["Chiroqchi", "Markaziy", "Gulistan", "Tinchlik", "Istiqlol"] },
            District { name: "G'uzor", mahallas: &["G'uzor", "Bog'bon", "Yangiqishloq", "Mehrat", "Navoi"] },
            District { name: "Mirishkor", mahallas: &["Mirishkor", "Dustlik", "Gulzor", "Bog'ishamol", "Tinchlik"] },
            District { name: "Muborak", mahallas: &["Muborak", "Yangiariq", "Istiqlol", "Gulistan", "Mehrat"] },
            District { name: "Nishon", mahallas: &["Nishon", "Markaziy", "Bog'bon", "Dustlik", "Navoi"] },
            District { name: "Shahrisabz", mahallas: &["Shahrisabz", "Gulzor", "Tinchlik", "Yangiqishloq", "Istiqlol"] },
            District { name: "Yakkabog'", mahallas: &["Yakkabog'", "Bog'ishamol", "Mehrat", "Gulistan", "Yangiariq"] },
        ],
    },
    Region {
        name: "Navoiy",
        districts: &[
            District { name: "Navoiy shahri", mahallas: &["Markaziy", "Kimyogarlar", "Metallurg", "Sharq", "G'arb"] },
            District { name: "Zarafshon", mahallas: &["Zarafshon", "Oltin Vodiy", "Yangi Hayot", "Gulistan", "Dustlik"] },
            District { name: "Xatirchi", mahallas: &["Xatirchi", "Guliston", "Tinchlik", "Bog'bon", "Yangiariq"] },
            District { name: "Navbahor", mahallas: &["Navbahor", "Bog'bon", "Istiqlol", "Mehrat", "Gulzor"] },
            District { name: "Tomdi", mahallas: &["Tomdi", "Yangiariq", "Mustaqillik", "Dustlik", "Navoi"] },
            District { name: "Bespah", mahallas: &["Bespah", "Bog'ishamol", "Gulistan", "Tinchlik", "Istiqlol"] },
            District { name: "Karmana", mahallas: &["Karmana", "Markaziy", "Yangiqishloq", "Mehrat", "Gulzor"] },
            District { name: "Konimex", mahallas: &["Konimex", "Dustlik", "Bog'bon", "Navoi", "Yangiariq"] },
            District { name: "Nurota", mahallas: &["Nurota", "Gulzor", "Tinchlik", "Istiqlol", "Gulistan"] },
            District { name: "Uchquduq", mahallas: &["Uchquduq", "Bog'ishamol", "Mehrat", "Dustlik", "Yangiqishloq"] },
        ],
    },
    Region {
        name: "Namangan",
        districts: &[
            District { name: "Namangan shahri", mahallas: &["Markaziy", "Sharq", "Shimol", "G'arb", "Janub"] },
            District { name: "Chortoq", mahallas: &["Chortoq", "Yangi Hayot", "Guliston", "Bog'bon", "Dustlik"] },
            District { name: "Kosonsoy", mahallas: &["Kosonsoy", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Mingbuloq", mahallas: &["Mingbuloq", "Istiqlol", "Mustaqillik", "Gulzor", "Navoi"] },
            District { name: "Pop", mahallas: &["Pop", "Yangiariq", "Mehnat", "Bog'ishamol", "Dustlik"] },
            District { name: "Chust", mahallas: &["Chust", "Markaziy", "Gulistan", "Tinchlik", "Istiqlol"] },
            District { name: "Norin", mahallas: &["Norin", "Bog'bon", "Yangiqishloq", "Mehrat", "Gulzor"] },
            District { name: "To'raqo'rg'on", mahallas: &["To'raqo'rg'on", "Dustlik", "Navoi", "Bog'ishamol", "Yangiariq"] },
            District { name: "Uychi", mahallas: &["Uychi", "Gulzor", "Tinchlik", "Istiqlol", "Gulistan"] },
            District { name: "Uchqo'rg'on", mahallas: &["Uchqo'rg'on", "Mehrat", "Bog'bon", "Dustlik", "Yangiqishloq"] },
            District { name: "Yangiqo'rg'on", mahallas: &["Yangiqo'rg'on", "Bog'ishamol", "Navoi", "Tinchlik", "Gulzor"] },
            District { name: "Yangihayot", mahallas: &["Yangihayot", "Yangiariq", "Istiqlol", "Gulistan", "Mehrat"] },
        ],
    },
    Region {
        name: "Samarqand",
        districts: &[
            District { name: "Samarqand shahri", mahallas: &["Markaziy", "Afrosiyob", "Registon", "Sharq", "Shimol"] },
            District { name: "Bulung'ur", mahallas: &["Bulung'ur", "Yangi Hayot", "Guliston", "Bog'bon", "Dustlik"] },
            District { name: "Kattaqo'rg'on", mahallas: &["Kattaqo'rg'on", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Ishtixon", mahallas: &["Ishtixon", "Istiqlol", "Mustaqillik", "Gulzor", "Navoi", "Moxpar", "Moxpar MFY", "Moxpar mahallasi"] },
            District { name: "Narpay", mahallas: &["Narpay", "Yangiariq", "Mehnat", "Bog'ishamol", "Dustlik"] },
            District { name: "Jomboy", mahallas: &["Jomboy", "Markaziy", "Gulistan", "Tinchlik", "Istiqlol"] },
            District { name: "Oqdaryo", mahallas: &["Oqdaryo", "Bog'bon", "Yangiqishloq", "Mehrat", "Gulzor"] },
            District { name: "Payariq", mahallas: &["Payariq", "Dustlik", "Navoi", "Bog'ishamol", "Yangiariq", "Bahor"] },
            District { name: "Pastdarg'om", mahallas: &["Pastdarg'om", "Gulzor", "Tinchlik", "Istiqlol", "Gulistan"] },
            District { name: "Qo'shrabot", mahallas: &["Qo'shrabot", "Mehrat", "Bog'bon", "Dustlik", "Yangiqishloq"] },
            District { name: "Toyloq", mahallas: &["Toyloq", "Bog'ishamol", "Navoi", "Tinchlik", "Gulzor"] },
            District { name: "Urgut", mahallas: &["Urgut", "Yangiariq", "Istiqlol", "Gulistan", "Mehrat"] },
        ],
    },
    Region {
        name: "Surxondaryo",
        districts: &[
            District { name: "Termiz", mahallas: &["Markaziy", "Amir Temur", "Al-Hakim At-Termiziy", "Sharq", "G'arb"] },
            District { name: "Angor", mahallas: &["Angor", "Yangi Hayot", "Guliston", "Bog'bon", "Dustlik"] },
            District { name: "Boysun", mahallas: &["Boysun", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Denov", mahallas: &["Denov", "Istiqlol", "Mustaqillik", "Gulzor", "Navoi"] },
            District { name: "Jarqo'rg'on", mahallas: &["Jarqo'rg'on", "Yangiariq", "Mehnat", "Bog'ishamol", "Dustlik"] },
            District { name: "Bandixon", mahallas: &["Bandixon", "Markaziy", "Gulistan", "Tinchlik", "Istiqlol"] },
            District { name: "Muzrabot", mahallas: &["Muzrabot", "Bog'bon", "Yangiqishloq", "Mehrat", "Gulzor"] },
            District { name: "Oltinsoy", mahallas: &["Oltinsoy", "Dustlik", "Navoi", "Bog'ishamol", "Yangiariq"] },
            District { name: "Sariosiyo", mahallas: &["Sariosiyo", "Gulzor", "Tinchlik", "Istiqlol", "Gulistan"] },
            District { name: "Sherobod", mahallas: &["Sherobod", "Mehrat", "Bog'bon", "Dustlik", "Yangiqishloq"] },
            District { name: "Sho'rchi", mahallas: &["Sho'rchi", "Bog'ishamol", "Navoi", "Tinchlik", "Gulzor"] },
            District { name: "Uzun", mahallas: &["Uzun", "Yangiariq", "Istiqlol", "Gulistan", "Mehrat"] },
        ],
    },
    Region {
        name: "Sirdaryo",
        districts: &[
            District { name: "Guliston", mahallas: &["Markaziy", "Istiqlol", "Mustaqillik", "Sharq", "G'arb"] },
            District { name: "Boyovut", mahallas: &["Boyovut", "Yangi Hayot", "Guliston", "Bog'bon", "Dustlik"] },
            District { name: "Mirzaobod", mahallas: &["Mirzaobod", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Sayxunobod", mahallas: &["Sayxunobod", "Yangiariq", "Mehnat", "Bog'ishamol", "Dustlik"] },
            District { name: "Xovos", mahallas: &["Xovos", "Oqqo'rg'on", "Dustlik", "Gulzor", "Navoi"] },
            District { name: "Guliston tumani", mahallas: &["Markaziy", "Gulistan", "Tinchlik", "Istiqlol", "Mehrat"] },
            District { name: "Oqoltin", mahallas: &["Oqoltin", "Bog'bon", "Yangiqishloq", "Gulzor", "Dustlik"] },
            District { name: "Sardoba", mahallas: &["Sardoba", "Bog'ishamol", "Navoi", "Tinchlik", "Yangiariq"] },
            District { name: "Sirdaryo tumani", mahallas: &["Sirdaryo", "Gulzor", "Istiqlol", "Gulistan", "Mehrat"] },
            District { name: "Yangiyer", mahallas: &["Yangiyer", "Yangiariq", "Bog'bon", "Dustlik", "Yangiqishloq"] },
        ],
    },
    Region {
        name: "Toshkent",
        districts: &[
            District { name: "Olmaliq", mahallas: &["Markaziy", "Metallurg", "Kimyogar", "Sharq", "G'arb"] },
            District { name: "Angren", mahallas: &["Angren", "Qumtepa", "Yangi Angren", "Gulistan", "Dustlik"] },
            District { name: "Bekobod", mahallas: &["Bekobod", "Tinchlik", "Guliston", "Bog'bon", "Yangiariq"] },
            District { name: "Bo'ka", mahallas: &["Bo'ka", "Bog'bon", "Yangi Hayot", "Mehrat", "Gulzor"] },
            District { name: "Bo'stonliq", mahallas: &["Bo'stonliq", "Istiqlol", "Mustaqillik", "Dustlik", "Navoi"] },
            District { name: "Chinoz", mahallas: &["Chinoz", "Markaziy", "Bog'ishamol", "Gulistan", "Tinchlik"] },
            District { name: "Chirchiq", mahallas: &["Chirchiq", "Yangiqishloq", "Mehrat", "Gulzor", "Istiqlol"] },
            District { name: "Ohangaron", mahallas: &["Ohangaron", "Dustlik", "Navoi", "Bog'bon", "Yangiariq"] },
            District { name: "Oqqo'rg'on", mahallas: &["Oqqo'rg'on", "Gulzor", "Tinchlik", "Gulistan", "Mehrat"] },
            District { name: "Parkent", mahallas: &["Parkent", "Bog'ishamol", "Yangiqishloq", "Dustlik", "Istiqlol"] },
            District { name: "Piskent", mahallas: &["Piskent", "Yangiariq", "Bog'bon", "Navoi", "Gulzor"] },
            District { name: "Quyichirchiq", mahallas: &["Quyichirchiq", "Tinchlik", "Gulistan", "Mehrat", "Bog'ishamol"] },
            District { name: "O'rtachirchiq", mahallas: &["O'rtachirchiq", "Dustlik", "Yangiqishloq", "Istiqlol", "Yangiariq"] },
            District { name: "Yangiyo'l", mahallas: &["Yangiyo'l", "Gulzor", "Navoi", "Bog'bon", "Tinchlik"] },
            District { name: "Toshkent tumani", mahallas: &["Toshkent", "Markaziy", "Gulistan", "Mehrat", "Dustlik"] },
            District { name: "Yuqorichirchiq", mahallas: &["Yuqorichirchiq", "Bog'ishamol", "Istiqlol", "Yangiariq", "Gulzor"] },
            District { name: "Zangiota", mahallas: &["Zangiota", "Tinchlik", "Navoi", "Gulistan", "Yangiqishloq"] },
            District { name: "Nurafshon", mahallas: &["Nurafshon", "Mehrat", "Bog'bon", "Dustlik", "Istiqlol"] },
        ],
    },
    Region {
        name: "Farg'ona",
        districts: &[
            District { name: "Farg'ona shahri", mahallas: &["Markaziy", "Yangi Farg'ona", "Qo'qon yo'li", "Sharq", "G'arb"] },
            District { name: "Marg'ilon", mahallas: &["Marg'ilon", "Ipakchi", "Hunarmand", "Gulistan", "Dustlik"] },
            District { name: "Qo'qon", mahallas: &["Qo'qon", "Amir Temur", "Markaziy", "Bog'bon", "Tinchlik"] },
            District { name: "Beshariq", mahallas: &["Beshariq", "Yangi Hayot", "Guliston", "Yangiariq", "Mehrat"] },
            District { name: "Bog'dod", mahallas: &["Bog'dod", "Bog'bon", "Tinchlik", "Gulzor", "Navoi"] },
            District { name: "Buvayda", mahallas: &["Buvayda", "Istiqlol", "Mustaqillik", "Dustlik", "Bog'ishamol"] },
            District { name: "Dang'ara", mahallas: &["Dang'ara", "Markaziy", "Gulistan", "Yangiqishloq", "Mehrat"] },
            District { name: "Ferghana tumani", mahallas: &["Ferghana", "Bog'bon", "Tinchlik", "Gulzor", "Yangiariq"] },
            District { name: "Furqat", mahallas: &["Furqat", "Dustlik", "Navoi", "Istiqlol", "Bog'ishamol"] },
            District { name: "Quva", mahallas: &["Quva", "Gulzor", "Gulistan", "Mehrat", "Tinchlik"] },
            District { name: "Rishton", mahallas: &["Rishton", "Yangiqishloq", "Bog'bon", "Dustlik", "Yangiariq"] },
            District { name: "So'x", mahallas: &["So'x", "Bog'ishamol", "Navoi", "Gulzor", "Istiqlol"] },
            District { name: "Toshloq", mahallas: &["Toshloq", "Tinchlik", "Gulistan", "Mehrat", "Dustlik"] },
            District { name: "Uchko'prik", mahallas: &["Uchko'prik", "Yangiariq", "Bog'bon", "Yangiqishloq", "Gulzor"] },
            District { name: "Yozyovon", mahallas: &["Yozyovon", "Bog'ishamol", "Navoi", "Istiqlol", "Tinchlik"] },
            District { name: "Oltiariq", mahallas: &["Oltiariq", "Gulistan", "Mehrat", "Dustlik", "Yangiariq"] },
        ],
    },
    Region {
        name: "Xorazm",
        districts: &[
            District { name: "Urganch", mahallas: &["Markaziy", "Al-Xorazmiy", "Avesto", "Sharq", "G'arb"] },
            District { name: "Xiva", mahallas: &["Xiva", "Ichan Qala", "Toshqo'rg'on", "Gulistan", "Dustlik"] },
            District { name: "Shovot", mahallas: &["Shovot", "Yangi Hayot", "Guliston", "Bog'bon", "Tinchlik"] },
            District { name: "Qo'shko'pir", mahallas: &["Qo'shko'pir", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Yangiariq", mahallas: &["Yangiariq", "Istiqlol", "Mustaqillik", "Gulzor", "Navoi"] },
            District { name: "Bog'ot", mahallas: &["Bog'ot", "Markaziy", "Bog'ishamol", "Gulistan", "Dustlik"] },
            District { name: "Gurlan", mahallas: &["Gurlan", "Yangiqishloq", "Mehrat", "Gulzor", "Tinchlik"] },
            District { name: "Hazorasp", mahallas: &["Hazorasp", "Dustlik", "Navoi", "Bog'bon", "Yangiariq"] },
            District { name: "Xonqa", mahallas: &["Xonqa", "Gulzor", "Istiqlol", "Gulistan", "Bog'ishamol"] },
            District { name: "Yangibozor", mahallas: &["Yangibozor", "Tinchlik", "Mehrat", "Dustlik", "Yangiqishloq"] },
            District { name: "Tuproqqal'a", mahallas: &["Tuproqqal'a", "Yangiariq", "Bog'bon", "Navoi", "Gulzor"] },
            District { name: "Urganch tumani", mahallas: &["Urganch", "Bog'ishamol", "Gulistan", "Istiqlol", "Tinchlik"] },
        ],
    },
    Region {
        name: "Qoraqalpog'iston",
        districts: &[
            District { name: "Nukus", mahallas: &["Markaziy", "Berdaqh", "Ajiniyoz", "Sharq", "G'arb"] },
            District { name: "Xo'jayli", mahallas: &["Xo'jayli", "Yangi Hayot", "Guliston", "Bog'bon", "Dustlik"] },
            District { name: "Qo'ng'irot", mahallas: &["Qo'ng'irot", "Bog'bon", "Tinchlik", "Yangiariq", "Mehrat"] },
            District { name: "Taxiatosh", mahallas: &["Taxiatosh", "Istiqlol", "Mustaqillik", "Gulzor", "Navoi"] },
            District { name: "To'rtko'l", mahallas: &["To'rtko'l", "Yangiariq", "Mehnat", "Bog'ishamol", "Dustlik"] },
            District { name: "Amudaryo", mahallas: &["Amudaryo", "Markaziy", "Gulistan", "Tinchlik", "Gulzor"] },
            District { name: "Beruniy", mahallas: &["Beruniy", "Bog'bon", "Yangiqishloq", "Mehrat", "Istiqlol"] },
            District { name: "Chimboy", mahallas: &["Chimboy", "Dustlik", "Navoi", "Bog'ishamol", "Yangiariq"] },
            District { name: "Ellikqala", mahallas: &["Ellikqala", "Gulzor", "Tinchlik", "Gulistan", "Mehrat"] },
            District { name: "Kegeyli", mahallas: &["Kegeyli", "Yangiqishloq", "Bog'bon", "Dustlik", "Istiqlol"] },
            District { name: "Mo'ynoq", mahallas: &["Mo'ynoq", "Bog'ishamol", "Navoi", "Yangiariq", "Gulzor"] },
            District { name: "Qanliko'l", mahallas: &["Qanliko'l", "Tinchlik", "Gulistan", "Mehrat", "Dustlik"] },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_all_fourteen_regions() {
        assert_eq!(region_names().count(), 14);
        assert!(is_known_region("Toshkent shahri"));
        assert!(is_known_region("Qoraqalpog'iston"));
        assert!(!is_known_region("Atlantis"));
    }

    #[test]
    fn districts_belong_to_their_region() {
        assert!(is_known_district("Toshkent shahri", "Chilonzor"));
        assert!(!is_known_district("Andijon", "Chilonzor"));
        assert!(districts("Atlantis").is_empty());
    }

    #[test]
    fn every_district_lists_mahallas() {
        for region in REGIONS {
            assert!(!region.districts.is_empty(), "{}", region.name);
            for district in region.districts {
                assert!(!district.mahallas.is_empty(), "{}", district.name);
            }
        }
        assert!(mahallas("Toshkent shahri", "Bektemir").iter().any(|m| *m == "Kuyluk"));
        assert!(mahallas("Toshkent shahri", "Nowhere").is_empty());
    }
}
