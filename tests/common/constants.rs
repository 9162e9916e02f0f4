pub const START_TIME: i64 = 1_700_000_000;

pub const STATION_NAME: &str = "Everfree Radio";
pub const NOWPLAYING_URL: &str = "http://radio.test/nowplaying.txt";

pub const PONYFM_BASE_URL: &str = "http://catalog.test/ponyfm";
pub const PONYFM_PAGE_1_URL: &str = "http://catalog.test/ponyfm?page=1&client=radiosync";
pub const PONYFM_PAGE_2_URL: &str = "http://catalog.test/ponyfm?page=2&client=radiosync";

pub const SONG_1_ARTIST: &str = "Mane Six";
pub const SONG_1_TITLE: &str = "Winter Wrap Up";
pub const SONG_2_ARTIST: &str = "Vinyl Scratch";
pub const SONG_2_TITLE: &str = "Bass Cannon";
